use crate::algorithms::common::PathfindingAlgorithm;
use crate::algorithms::heuristic::manhattan;
use crate::error::{Endpoint, EndpointIssue, PathfindingError, Result};
use crate::grid::{Grid, Position};
use pathfinding::prelude::astar;

/// Independent A* built on the `pathfinding` crate.
///
/// Reads obstacle flags directly instead of the grid's neighbor caches and
/// never touches cell search state, so it can check the stepping engine.
#[derive(Default)]
pub struct ReferenceAStar;

impl ReferenceAStar {
    pub fn new() -> Self {
        ReferenceAStar
    }

    /// Edge count of a shortest path, or `None` if the goal is unreachable.
    pub fn shortest_length(&self, grid: &Grid, start: Position, goal: Position) -> Option<usize> {
        self.search(grid, start, goal).map(|(_, cost)| cost as usize)
    }

    fn search(&self, grid: &Grid, start: Position, goal: Position) -> Option<(Vec<Position>, u32)> {
        if !grid.contains(start) || grid.is_obstacle(start) {
            return None;
        }

        astar(
            &start,
            |p| {
                let p = *p;
                [
                    p.y.checked_sub(1).map(|y| Position { x: p.x, y }),
                    p.x.checked_sub(1).map(|x| Position { x, y: p.y }),
                    Some(Position { x: p.x + 1, y: p.y }),
                    Some(Position { x: p.x, y: p.y + 1 }),
                ]
                .into_iter()
                .flatten()
                .filter(|n| grid.contains(*n) && !grid.is_obstacle(*n))
                .map(|n| (n, 1u32))
                .collect::<Vec<_>>()
            },
            |p| manhattan(*p, goal) as u32,
            |p| *p == goal,
        )
    }
}

impl PathfindingAlgorithm for ReferenceAStar {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn find_path(
        &mut self,
        grid: &mut Grid,
        start: Position,
        goal: Position,
    ) -> Result<Option<Vec<Position>>> {
        for (endpoint, pos) in [(Endpoint::Start, start), (Endpoint::End, goal)] {
            let issue = if !grid.contains(pos) {
                EndpointIssue::OutOfBounds(pos)
            } else if grid.is_obstacle(pos) {
                EndpointIssue::Obstacle(pos)
            } else {
                continue;
            };
            return Err(PathfindingError::InvalidEndpoint { endpoint, issue });
        }

        Ok(self.search(grid, start, goal).map(|(path, _)| path))
    }
}
