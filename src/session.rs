//! Driver-facing control surface: one grid, one engine, and the editing
//! commands an interactive front end issues between frames.

use tracing::{debug, warn};

use crate::algorithms::a_star::{SearchEngine, SearchOptions, SearchStatus, StepMode};
use crate::algorithms::heuristic::HeuristicKind;
use crate::error::Result;
use crate::grid::{Grid, Position, Role};

pub struct Session {
    grid: Grid,
    engine: SearchEngine,
    auto_search: bool,
}

impl Session {
    /// With `auto_search`, placing an endpoint or editing an obstacle
    /// restarts the search as soon as both endpoints exist.
    pub fn new(rows: usize, cols: usize, options: SearchOptions, auto_search: bool) -> Self {
        Session {
            grid: Grid::new(rows, cols),
            engine: SearchEngine::new(options),
            auto_search,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn status(&self) -> SearchStatus {
        self.engine.status()
    }

    pub fn set_auto_search(&mut self, auto_search: bool) {
        self.auto_search = auto_search;
    }

    pub fn set_start(&mut self, pos: Position) -> Result<SearchStatus> {
        self.grid.set_role(pos, Role::Start)?;
        self.after_edit()
    }

    pub fn set_end(&mut self, pos: Position) -> Result<SearchStatus> {
        self.grid.set_role(pos, Role::End)?;
        self.after_edit()
    }

    pub fn set_obstacle(&mut self, pos: Position, value: bool) -> Result<SearchStatus> {
        self.grid.set_obstacle(pos, value)?;
        self.after_edit()
    }

    pub fn toggle_obstacle(&mut self, pos: Position) -> Result<SearchStatus> {
        self.grid.toggle_obstacle(pos)?;
        self.after_edit()
    }

    /// Switches between Manhattan and Euclidean for the next search.
    pub fn toggle_heuristic(&mut self) -> HeuristicKind {
        let mut options = self.engine.options();
        options.heuristic = options.heuristic.toggled();
        self.engine.set_options(options);
        options.heuristic
    }

    /// Switches between batch and incremental for the next search.
    pub fn toggle_step_mode(&mut self) -> StepMode {
        let mut options = self.engine.options();
        options.step_mode = options.step_mode.toggled();
        self.engine.set_options(options);
        options.step_mode
    }

    /// Starts a fresh search between the grid's current endpoints.
    pub fn search(&mut self) -> Result<SearchStatus> {
        let (start, end) = (self.grid.start(), self.grid.end());
        self.engine.start(&mut self.grid, start, end)
    }

    pub fn step(&mut self) -> SearchStatus {
        self.engine.step(&mut self.grid)
    }

    pub fn run_to_completion(&mut self) -> SearchStatus {
        self.engine.run_to_completion(&mut self.grid)
    }

    /// Abandons the current search and clears the visited/path markings.
    pub fn clear(&mut self) {
        self.engine.reset(&mut self.grid);
    }

    /// Restarts the search if obstacles changed since it began.
    pub fn replan_if_stale(&mut self) -> Result<SearchStatus> {
        if self.engine.is_stale(&self.grid) {
            warn!(revision = self.grid.revision(), "grid edited during search, replanning");
            self.search()
        } else {
            Ok(self.engine.status())
        }
    }

    pub fn path(&self) -> Result<Option<&[Position]>> {
        self.engine.result()
    }

    fn after_edit(&mut self) -> Result<SearchStatus> {
        if !self.auto_search || self.grid.start().is_none() || self.grid.end().is_none() {
            return Ok(self.engine.status());
        }
        debug!("edit triggered a new search");
        match self.search() {
            Ok(status) => Ok(status),
            Err(e) => {
                // Drop the old search so its markings do not describe a grid
                // that no longer exists.
                self.engine.reset(&mut self.grid);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Endpoint, EndpointIssue, PathfindingError};
    use crate::grid::CellState;

    fn session(auto_search: bool) -> Session {
        Session::new(5, 5, SearchOptions::default(), auto_search)
    }

    #[test]
    fn endpoints_trigger_search_once_both_exist() {
        let mut s = session(true);
        assert_eq!(s.set_start(Position::new(0, 0)).unwrap(), SearchStatus::Idle);
        assert_eq!(s.set_end(Position::new(4, 4)).unwrap(), SearchStatus::Succeeded);
        assert_eq!(s.path().unwrap().map(|p| p.len()), Some(9));
    }

    #[test]
    fn obstacle_edit_replans() {
        let mut s = session(true);
        s.set_start(Position::new(0, 2)).unwrap();
        s.set_end(Position::new(4, 2)).unwrap();
        assert_eq!(s.path().unwrap().map(|p| p.len()), Some(5));

        s.toggle_obstacle(Position::new(2, 2)).unwrap();
        assert_eq!(s.path().unwrap().map(|p| p.len()), Some(7));
        assert!(!s.engine().is_stale(s.grid()));
    }

    #[test]
    fn blocking_an_endpoint_clears_the_search() {
        let mut s = session(true);
        s.set_start(Position::new(0, 0)).unwrap();
        s.set_end(Position::new(4, 4)).unwrap();

        let err = s.set_obstacle(Position::new(4, 4), true).unwrap_err();
        assert_eq!(
            err,
            PathfindingError::InvalidEndpoint {
                endpoint: Endpoint::End,
                issue: EndpointIssue::Obstacle(Position::new(4, 4))
            }
        );
        assert_eq!(s.status(), SearchStatus::Idle);
        assert!(s.grid().cells().all(|c| !c.on_path()));
    }

    #[test]
    fn batched_edits_then_manual_replan() {
        let mut s = session(false);
        s.set_start(Position::new(0, 0)).unwrap();
        s.set_end(Position::new(4, 0)).unwrap();
        s.toggle_step_mode();
        assert_eq!(s.search().unwrap(), SearchStatus::Running);
        s.step();

        for y in 0..4 {
            s.set_obstacle(Position::new(2, y), true).unwrap();
        }
        assert!(s.engine().is_stale(s.grid()));
        assert_eq!(s.replan_if_stale().unwrap(), SearchStatus::Running);
        assert_eq!(s.run_to_completion(), SearchStatus::Succeeded);
        // Around the wall through the bottom row.
        assert_eq!(s.path().unwrap().map(|p| p.len()), Some(13));
    }

    #[test]
    fn toggles_apply_to_next_search() {
        let mut s = session(false);
        assert_eq!(s.toggle_heuristic(), HeuristicKind::Euclidean);
        assert_eq!(s.toggle_step_mode(), StepMode::Incremental);
        assert_eq!(s.engine().options().heuristic, HeuristicKind::Euclidean);
    }

    #[test]
    fn clear_resets_cells() {
        let mut s = session(true);
        s.set_start(Position::new(0, 0)).unwrap();
        s.set_end(Position::new(3, 3)).unwrap();
        s.clear();
        assert_eq!(s.status(), SearchStatus::Idle);
        assert!(s.grid().cells().all(|c| c.state() == CellState::Unvisited));
        assert!(s.path().is_err());
    }
}
