use std::fmt;

use tracing::debug;

use crate::error::{PathfindingError, Result};

/// A cell coordinate: `x` is the column, `y` the row, both 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// True when `other` is directly north, south, east or west of `self`.
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Search membership of a cell. Transitions only Unvisited -> Open -> Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Unvisited,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    None,
    Start,
    End,
}

/// One grid unit: fixed identity plus the transient fields of the current search.
#[derive(Debug, Clone)]
pub struct Cell {
    position: Position,
    obstacle: bool,
    role: Role,
    pub(crate) neighbors: Vec<Position>,
    pub(crate) g_cost: f64,
    pub(crate) h_cost: f64,
    pub(crate) f_cost: f64,
    pub(crate) parent: Option<Position>,
    pub(crate) state: CellState,
    pub(crate) on_path: bool,
}

impl Cell {
    fn new(position: Position) -> Self {
        Cell {
            position,
            obstacle: false,
            role: Role::None,
            neighbors: Vec::with_capacity(4),
            g_cost: f64::INFINITY,
            h_cost: 0.0,
            f_cost: f64::INFINITY,
            parent: None,
            state: CellState::Unvisited,
            on_path: false,
        }
    }

    fn reset(&mut self) {
        self.g_cost = f64::INFINITY;
        self.h_cost = 0.0;
        self.f_cost = f64::INFINITY;
        self.parent = None;
        self.state = CellState::Unvisited;
        self.on_path = false;
    }

    pub(crate) fn update_f_cost(&mut self) {
        self.f_cost = self.g_cost + self.h_cost;
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_obstacle(&self) -> bool {
        self.obstacle
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Orthogonal non-obstacle neighbors as of the last `Grid::rebuild_neighbors`.
    pub fn neighbors(&self) -> &[Position] {
        &self.neighbors
    }

    /// Best known distance from the start; infinite until reached.
    pub fn g_cost(&self) -> f64 {
        self.g_cost
    }

    pub fn h_cost(&self) -> f64 {
        self.h_cost
    }

    pub fn f_cost(&self) -> f64 {
        self.f_cost
    }

    pub fn parent(&self) -> Option<Position> {
        self.parent
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn on_path(&self) -> bool {
        self.on_path
    }
}

/// Fixed-size grid owning every cell, stored row-major.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Option<Position>,
    end: Option<Position>,
    revision: u64,
    neighbors_revision: Option<u64>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for y in 0..rows {
            for x in 0..cols {
                cells.push(Cell::new(Position { x, y }));
            }
        }

        Grid {
            rows,
            cols,
            cells,
            start: None,
            end: None,
            revision: 0,
            neighbors_revision: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.cols && pos.y < self.rows
    }

    pub(crate) fn index_of(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.y * self.cols + pos.x)
    }

    fn checked_index(&self, pos: Position) -> Result<usize> {
        self.index_of(pos).ok_or(PathfindingError::OutOfBounds {
            position: pos,
            cols: self.cols,
            rows: self.rows,
        })
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.index_of(pos).map(|i| &self.cells[i])
    }

    pub(crate) fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(crate) fn cell_at_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(Cell::is_obstacle)
    }

    /// Sets the obstacle flag. Neighbor caches are left untouched until
    /// `rebuild_neighbors` so several edits can share one rebuild.
    pub fn set_obstacle(&mut self, pos: Position, value: bool) -> Result<()> {
        let index = self.checked_index(pos)?;
        if self.cells[index].obstacle != value {
            self.cells[index].obstacle = value;
            self.revision += 1;
            debug!(%pos, obstacle = value, revision = self.revision, "obstacle changed");
        }
        Ok(())
    }

    /// Flips the obstacle flag and returns its new value.
    pub fn toggle_obstacle(&mut self, pos: Position) -> Result<bool> {
        let value = !self.is_obstacle(pos);
        self.set_obstacle(pos, value)?;
        Ok(value)
    }

    /// Assigns `role` to `pos`. Start and End each have at most one holder,
    /// so the previous holder is cleared. `Role::None` clears whatever `pos` held.
    pub fn set_role(&mut self, pos: Position, role: Role) -> Result<()> {
        let index = self.checked_index(pos)?;

        match self.cells[index].role {
            Role::Start => self.start = None,
            Role::End => self.end = None,
            Role::None => {}
        }

        let previous = match role {
            Role::Start => self.start.replace(pos),
            Role::End => self.end.replace(pos),
            Role::None => None,
        };
        if let Some(previous) = previous.and_then(|p| self.index_of(p)) {
            self.cells[previous].role = Role::None;
        }

        self.cells[index].role = role;
        Ok(())
    }

    pub fn clear_role(&mut self, role: Role) {
        let holder = match role {
            Role::Start => self.start.take(),
            Role::End => self.end.take(),
            Role::None => None,
        };
        if let Some(index) = holder.and_then(|p| self.index_of(p)) {
            self.cells[index].role = Role::None;
        }
    }

    pub fn start(&self) -> Option<Position> {
        self.start
    }

    pub fn end(&self) -> Option<Position> {
        self.end
    }

    /// Incremented on every obstacle change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when obstacles changed after the last `rebuild_neighbors`.
    pub fn neighbors_stale(&self) -> bool {
        self.neighbors_revision != Some(self.revision)
    }

    /// Recomputes every non-obstacle cell's neighbor list from the current
    /// obstacle flags, in north, west, east, south order. Obstacle cells get
    /// an empty list.
    pub fn rebuild_neighbors(&mut self) {
        for index in 0..self.cells.len() {
            let pos = self.cells[index].position;
            let mut neighbors = std::mem::take(&mut self.cells[index].neighbors);
            neighbors.clear();

            if !self.cells[index].obstacle {
                let candidates = [
                    pos.y.checked_sub(1).map(|y| Position { x: pos.x, y }),
                    pos.x.checked_sub(1).map(|x| Position { x, y: pos.y }),
                    Some(Position { x: pos.x + 1, y: pos.y }),
                    Some(Position { x: pos.x, y: pos.y + 1 }),
                ];
                for candidate in candidates.into_iter().flatten() {
                    if self.cell(candidate).is_some_and(|c| !c.obstacle) {
                        neighbors.push(candidate);
                    }
                }
            }

            self.cells[index].neighbors = neighbors;
        }
        self.neighbors_revision = Some(self.revision);
    }

    /// Clears every cell's transient search fields. Obstacles and roles stay.
    pub fn reset_search_state(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }
}

/// Legend: S=Start, G=Goal, #=Obstacle, *=Path, o=Open, x=Closed, .=Unvisited
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..self.cols {
            write!(f, "{:2}", x % 10)?;
        }
        writeln!(f)?;

        for (y, row) in self.cells.chunks(self.cols.max(1)).enumerate() {
            write!(f, "{:2} ", y)?;
            for cell in row {
                let symbol = if cell.obstacle {
                    '#'
                } else {
                    match (cell.role, cell.on_path, cell.state) {
                        (Role::Start, _, _) => 'S',
                        (Role::End, _, _) => 'G',
                        (_, true, _) => '*',
                        (_, _, CellState::Open) => 'o',
                        (_, _, CellState::Closed) => 'x',
                        (_, _, CellState::Unvisited) => '.',
                    }
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
