use std::fmt;

use clap::ValueEnum;

use crate::grid::Position;

/// Distance estimate used to rank frontier cells. Both variants are
/// admissible for unit-cost 4-connected movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HeuristicKind {
    #[default]
    Manhattan,
    Euclidean,
}

impl HeuristicKind {
    pub fn estimate(self, from: Position, to: Position) -> f64 {
        match self {
            HeuristicKind::Manhattan => manhattan(from, to),
            HeuristicKind::Euclidean => euclidean(from, to),
        }
    }

    /// The other variant.
    pub fn toggled(self) -> Self {
        match self {
            HeuristicKind::Manhattan => HeuristicKind::Euclidean,
            HeuristicKind::Euclidean => HeuristicKind::Manhattan,
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicKind::Manhattan => write!(f, "manhattan"),
            HeuristicKind::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Manhattan (L1) distance; exact for obstacle-free 4-connected grids.
#[inline]
pub fn manhattan(a: Position, b: Position) -> f64 {
    (a.x.abs_diff(b.x) + a.y.abs_diff(b.y)) as f64
}

/// Straight-line (L2) distance.
#[inline]
pub fn euclidean(a: Position, b: Position) -> f64 {
    let dx = a.x.abs_diff(b.x) as f64;
    let dy = a.y.abs_diff(b.y) as f64;
    dx.hypot(dy)
}
