//! Grid shortest-path search that can run in one shot or one expansion at a
//! time, with obstacle edits and replanning between steps.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod grid;
pub mod session;
pub mod simulation;
pub mod statistics;

pub use algorithms::a_star::{SearchEngine, SearchOptions, SearchStatus, StepMode};
pub use algorithms::heuristic::HeuristicKind;
pub use error::{PathfindingError, Result};
pub use grid::{Cell, CellState, Grid, Position, Role};
pub use session::Session;
