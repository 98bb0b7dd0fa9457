use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use clap::ValueEnum;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::algorithms::common::PathfindingAlgorithm;
use crate::algorithms::heuristic::HeuristicKind;
use crate::error::{Endpoint, EndpointIssue, PathfindingError, Result};
use crate::grid::{CellState, Grid, Position};
use crate::statistics::SearchStats;

/// Lifecycle of a search. `Succeeded` and `Failed` are terminal until the
/// next `start` or `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl SearchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchStatus::Succeeded | SearchStatus::Failed)
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchStatus::Idle => "idle",
            SearchStatus::Running => "running",
            SearchStatus::Succeeded => "succeeded",
            SearchStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Whether `start` finishes the search itself or leaves it to `step` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StepMode {
    #[default]
    Batch,
    Incremental,
}

impl StepMode {
    pub fn toggled(self) -> Self {
        match self {
            StepMode::Batch => StepMode::Incremental,
            StepMode::Incremental => StepMode::Batch,
        }
    }
}

impl fmt::Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepMode::Batch => write!(f, "batch"),
            StepMode::Incremental => write!(f, "incremental"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub heuristic: HeuristicKind,
    pub step_mode: StepMode,
    /// Also flag the start cell as `on_path` after a successful search.
    pub mark_start_on_path: bool,
}

/// Heap entry. The heap is a max-heap, so `Ord` is reversed: lowest
/// `f_cost` first, then the cell that entered the frontier earliest.
#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    f_cost: f64,
    order: u64,
    index: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// A* over a [`Grid`] that can run to completion or one expansion at a time.
///
/// The engine never owns the grid: every call that touches cell state takes
/// it by reference, so a driver can render or edit between steps. Editing
/// obstacles while a search is `Running` leaves it working from stale
/// neighbor caches; check [`SearchEngine::is_stale`] and restart.
///
/// Ties on `f_cost` go to the cell that was first pushed onto the frontier.
/// A cell whose cost drops while open keeps its original place in that order.
#[derive(Debug, Default)]
pub struct SearchEngine {
    options: SearchOptions,
    status: SearchStatus,
    frontier: BinaryHeap<FrontierEntry>,
    insertion_order: FxHashMap<usize, u64>,
    open_count: usize,
    end_index: Option<usize>,
    current: Option<Position>,
    path: Vec<Position>,
    expansion_order: Vec<Position>,
    stats: SearchStats,
    grid_revision: u64,
    grid_rows: usize,
    grid_cols: usize,
}

impl SearchEngine {
    pub fn new(options: SearchOptions) -> Self {
        SearchEngine {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Takes effect on the next `start`.
    pub fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// The cell closed by the most recent step.
    pub fn current(&self) -> Option<Position> {
        self.current
    }

    /// Number of open cells.
    pub fn frontier_len(&self) -> usize {
        self.open_count
    }

    /// Every closed cell, in the order it was closed.
    pub fn expansion_order(&self) -> &[Position] {
        &self.expansion_order
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// True when obstacles changed since this search started, or when `grid`
    /// is not the shape the search started on.
    pub fn is_stale(&self, grid: &Grid) -> bool {
        self.status != SearchStatus::Idle
            && (grid.revision() != self.grid_revision || !self.same_shape(grid))
    }

    /// Prepares a new search from `start` to `end` and, in batch mode, runs it.
    ///
    /// Rebuilds neighbor caches, clears all transient cell state and fills in
    /// `h_cost` for every cell before seeding the frontier with `start`.
    pub fn start(
        &mut self,
        grid: &mut Grid,
        start: Option<Position>,
        end: Option<Position>,
    ) -> Result<SearchStatus> {
        let start_index = validate_endpoint(grid, Endpoint::Start, start)?;
        let end_index = validate_endpoint(grid, Endpoint::End, end)?;

        grid.rebuild_neighbors();
        grid.reset_search_state();

        let goal = grid.cell_at(end_index).position();
        let heuristic = self.options.heuristic;
        for cell in grid.cells_mut() {
            cell.h_cost = heuristic.estimate(cell.position(), goal);
        }

        self.clear();

        let start_cell = grid.cell_at_mut(start_index);
        start_cell.g_cost = 0.0;
        start_cell.update_f_cost();
        start_cell.state = CellState::Open;
        let f_cost = start_cell.f_cost;
        let origin = start_cell.position();

        self.push_frontier(start_index, f_cost);
        self.open_count = 1;
        self.stats.peak_frontier = 1;
        self.end_index = Some(end_index);
        self.grid_revision = grid.revision();
        self.grid_rows = grid.rows();
        self.grid_cols = grid.cols();
        self.status = SearchStatus::Running;

        info!(
            start = %origin,
            end = %goal,
            heuristic = %self.options.heuristic,
            step_mode = %self.options.step_mode,
            "search started"
        );

        if self.options.step_mode == StepMode::Batch {
            self.run_to_completion(grid);
        }
        Ok(self.status)
    }

    /// Performs one expansion. Outside `Running` this does nothing and
    /// returns the current status.
    pub fn step(&mut self, grid: &mut Grid) -> SearchStatus {
        if self.status != SearchStatus::Running {
            debug!(status = %self.status, "step ignored");
            return self.status;
        }
        // Frontier indices only mean something on the grid the search started on.
        if !self.same_shape(grid) {
            warn!(
                rows = grid.rows(),
                cols = grid.cols(),
                expected_rows = self.grid_rows,
                expected_cols = self.grid_cols,
                "step given a grid of another shape, ignored"
            );
            return self.status;
        }

        let Some(current_index) = self.pop_frontier(grid) else {
            self.status = SearchStatus::Failed;
            self.current = None;
            info!(expansions = self.stats.expansions, "frontier exhausted, no path");
            return self.status;
        };

        let current = grid.cell_at_mut(current_index);
        current.state = CellState::Closed;
        let current_pos = current.position();
        let current_g = current.g_cost;
        let neighbors = current.neighbors.clone();

        self.open_count -= 1;
        self.current = Some(current_pos);
        self.expansion_order.push(current_pos);
        self.stats.expansions += 1;
        debug!(current = %current_pos, g = current_g, "expanded");

        if Some(current_index) == self.end_index {
            self.reconstruct_path(grid, current_index);
            self.status = SearchStatus::Succeeded;
            info!(
                length = self.path.len().saturating_sub(1),
                expansions = self.stats.expansions,
                "path found"
            );
            return self.status;
        }

        let tentative_g = current_g + 1.0;
        for neighbor in neighbors {
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };
            let cell = grid.cell_at_mut(neighbor_index);
            if cell.is_obstacle() || cell.state == CellState::Closed {
                continue;
            }

            let unvisited = cell.state == CellState::Unvisited;
            if tentative_g < cell.g_cost || unvisited {
                if tentative_g < cell.g_cost {
                    cell.g_cost = tentative_g;
                }
                cell.update_f_cost();
                cell.parent = Some(current_pos);
                let f_cost = cell.f_cost;
                if unvisited {
                    cell.state = CellState::Open;
                    self.open_count += 1;
                }
                self.stats.relaxations += 1;
                self.push_frontier(neighbor_index, f_cost);
            }
        }

        self.stats.peak_frontier = self.stats.peak_frontier.max(self.open_count);
        self.status
    }

    /// Steps until the search succeeds or fails. Returns `Running` at once
    /// when `grid` is not the shape the search started on.
    pub fn run_to_completion(&mut self, grid: &mut Grid) -> SearchStatus {
        while self.status == SearchStatus::Running {
            if !self.same_shape(grid) {
                return self.step(grid);
            }
            self.step(grid);
        }
        self.status
    }

    /// The path from start to end inclusive, `None` when no path exists.
    pub fn result(&self) -> Result<Option<&[Position]>> {
        match self.status {
            SearchStatus::Succeeded => Ok(Some(self.path.as_slice())),
            SearchStatus::Failed => Ok(None),
            status => Err(PathfindingError::InvalidOperation(format!(
                "result requested while search is {}",
                status
            ))),
        }
    }

    /// Abandons any search and clears transient cell state.
    pub fn reset(&mut self, grid: &mut Grid) {
        self.clear();
        grid.reset_search_state();
        self.status = SearchStatus::Idle;
        debug!("search reset");
    }

    fn same_shape(&self, grid: &Grid) -> bool {
        grid.rows() == self.grid_rows && grid.cols() == self.grid_cols
    }

    fn clear(&mut self) {
        self.frontier.clear();
        self.insertion_order.clear();
        self.open_count = 0;
        self.end_index = None;
        self.current = None;
        self.path.clear();
        self.expansion_order.clear();
        self.stats = SearchStats::default();
    }

    fn push_frontier(&mut self, index: usize, f_cost: f64) {
        let next = self.insertion_order.len() as u64;
        let order = *self.insertion_order.entry(index).or_insert(next);
        self.frontier.push(FrontierEntry {
            f_cost,
            order,
            index,
        });
    }

    /// Pops the best open cell, dropping entries superseded by a cheaper
    /// push or belonging to cells already closed.
    fn pop_frontier(&mut self, grid: &Grid) -> Option<usize> {
        while let Some(entry) = self.frontier.pop() {
            let cell = grid.cell_at(entry.index);
            if cell.state == CellState::Open && cell.f_cost == entry.f_cost {
                return Some(entry.index);
            }
        }
        None
    }

    fn reconstruct_path(&mut self, grid: &mut Grid, end_index: usize) {
        self.path.clear();
        let mut cursor = Some(grid.cell_at(end_index).position());
        while let Some(pos) = cursor {
            self.path.push(pos);
            cursor = grid.cell(pos).and_then(|cell| cell.parent());
        }
        self.path.reverse();

        let skip = usize::from(!self.options.mark_start_on_path);
        for &pos in self.path.iter().skip(skip) {
            if let Some(index) = grid.index_of(pos) {
                grid.cell_at_mut(index).on_path = true;
            }
        }
    }
}

fn validate_endpoint(grid: &Grid, endpoint: Endpoint, pos: Option<Position>) -> Result<usize> {
    let issue = match pos {
        None => EndpointIssue::Missing,
        Some(pos) => match grid.index_of(pos) {
            None => EndpointIssue::OutOfBounds(pos),
            Some(index) if grid.cell_at(index).is_obstacle() => EndpointIssue::Obstacle(pos),
            Some(index) => return Ok(index),
        },
    };
    warn!(%endpoint, %issue, "endpoint rejected");
    Err(PathfindingError::InvalidEndpoint { endpoint, issue })
}

impl PathfindingAlgorithm for SearchEngine {
    fn name(&self) -> &'static str {
        "a_star"
    }

    fn find_path(
        &mut self,
        grid: &mut Grid,
        start: Position,
        goal: Position,
    ) -> Result<Option<Vec<Position>>> {
        self.start(grid, Some(start), Some(goal))?;
        self.run_to_completion(grid);
        Ok(self.result()?.map(<[Position]>::to_vec))
    }
}
