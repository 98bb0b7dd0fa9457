use crate::error::Result;
use crate::grid::{Grid, Position};

pub trait PathfindingAlgorithm {
    fn name(&self) -> &'static str;

    /// Finds a shortest path from `start` to `goal`, both included.
    /// `Ok(None)` means the goal is unreachable.
    fn find_path(
        &mut self,
        grid: &mut Grid,
        start: Position,
        goal: Position,
    ) -> Result<Option<Vec<Position>>>;
}
