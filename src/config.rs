use clap::Parser;

use crate::algorithms::a_star::{SearchOptions, StepMode};
use crate::algorithms::heuristic::HeuristicKind;
use crate::error::{PathfindingError, Result};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    #[arg(long, default_value_t = 20)]
    pub cols: usize,

    #[arg(long, default_value_t = 80)]
    pub num_obstacles: usize,

    #[arg(long, value_enum, default_value_t = HeuristicKind::Manhattan)]
    pub heuristic: HeuristicKind,

    #[arg(long, value_enum, default_value_t = StepMode::Batch)]
    pub step_mode: StepMode,

    /// Delay between rendered frames
    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// Seed for obstacle placement and edits; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rounds of obstacle edits, each followed by a new search
    #[arg(long, default_value_t = 3)]
    pub replans: usize,

    #[arg(long, default_value_t = 5)]
    pub edits_per_replan: usize,

    /// Mark the start cell as part of the drawn path
    #[arg(long, default_value_t = false)]
    pub mark_start: bool,

    /// Used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(PathfindingError::InvalidConfig(format!(
                "grid must have at least one row and column, got {}x{}",
                self.cols, self.rows
            )));
        }
        let cells = self.rows * self.cols;
        if cells < 2 {
            return Err(PathfindingError::InvalidConfig(
                "grid needs room for distinct start and end cells".to_string(),
            ));
        }
        if self.num_obstacles > cells - 2 {
            return Err(PathfindingError::InvalidConfig(format!(
                "{} obstacles do not fit in {} cells with both endpoints free",
                self.num_obstacles, cells
            )));
        }
        Ok(())
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            heuristic: self.heuristic,
            step_mode: self.step_mode,
            mark_start_on_path: self.mark_start,
        }
    }
}
