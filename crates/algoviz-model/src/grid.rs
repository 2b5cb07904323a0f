//! Rectangular cell grid for the pathfinding visualizer.
//!
//! Every cell has exactly one role. The grid keeps at most one start and one
//! end marker; placing a new one moves the old one.

use crate::error::{MutationError, Result};

/// Default number of grid rows.
pub const DEFAULT_ROWS: usize = 20;

/// Default number of grid columns.
pub const DEFAULT_COLS: usize = 40;

/// Largest accepted row or column count for a requested grid.
pub const MAX_DIM: usize = 200;

/// A cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    /// Create a new coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Mutually exclusive role of a pathfinding cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CellRole {
    #[default]
    Empty,
    Wall,
    Start,
    End,
    Visited,
    Path,
}

/// Row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellRole>,
    start: Option<Coord>,
    end: Option<Coord>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl Grid {
    /// Create a grid of empty cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellRole::Empty; rows * cols],
            start: None,
            end: None,
        }
    }

    /// Create a grid of the requested size, rejecting dimensions outside
    /// `1..=MAX_DIM`.
    pub fn sized(rows: usize, cols: usize) -> Result<Self> {
        for value in [rows, cols] {
            if !(1..=MAX_DIM).contains(&value) {
                return Err(MutationError::InvalidSize {
                    value,
                    min: 1,
                    max: MAX_DIM,
                });
            }
        }
        Ok(Self::new(rows, cols))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[CellRole] {
        &self.cells
    }

    pub fn start(&self) -> Option<Coord> {
        self.start
    }

    pub fn end(&self) -> Option<Coord> {
        self.end
    }

    /// Whether `at` lies inside the grid.
    pub fn in_bounds(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// Row-major index of `at`.
    pub fn index(&self, at: Coord) -> usize {
        at.row * self.cols + at.col
    }

    /// Coordinate of a row-major index.
    pub fn coord(&self, index: usize) -> Coord {
        Coord::new(index / self.cols, index % self.cols)
    }

    /// Role of the cell at `at`.
    pub fn get(&self, at: Coord) -> Option<CellRole> {
        self.in_bounds(at).then(|| self.cells[self.index(at)])
    }

    fn check(&self, at: Coord) -> Result<()> {
        if self.in_bounds(at) {
            Ok(())
        } else {
            Err(MutationError::OutOfBounds(at, self.rows, self.cols))
        }
    }

    fn is_marker(&self, at: Coord) -> bool {
        self.start == Some(at) || self.end == Some(at)
    }

    /// Flip a cell between wall and empty. Returns whether it is now a wall.
    pub fn toggle_wall(&mut self, at: Coord) -> Result<bool> {
        self.check(at)?;
        if self.is_marker(at) {
            return Err(MutationError::CellOccupied(at));
        }
        let idx = self.index(at);
        let wall = self.cells[idx] != CellRole::Wall;
        self.cells[idx] = if wall { CellRole::Wall } else { CellRole::Empty };
        Ok(wall)
    }

    /// Make a cell a wall (drag painting). Painting over a wall is a no-op.
    pub fn paint_wall(&mut self, at: Coord) -> Result<()> {
        self.check(at)?;
        if self.is_marker(at) {
            return Err(MutationError::CellOccupied(at));
        }
        let idx = self.index(at);
        self.cells[idx] = CellRole::Wall;
        Ok(())
    }

    /// Place the start marker, moving any existing one.
    pub fn set_start(&mut self, at: Coord) -> Result<()> {
        self.check(at)?;
        if self.cells[self.index(at)] == CellRole::Wall || self.end == Some(at) {
            return Err(MutationError::CellOccupied(at));
        }
        if let Some(old) = self.start.take() {
            let idx = self.index(old);
            self.cells[idx] = CellRole::Empty;
        }
        let idx = self.index(at);
        self.cells[idx] = CellRole::Start;
        self.start = Some(at);
        Ok(())
    }

    /// Place the end marker, moving any existing one.
    pub fn set_end(&mut self, at: Coord) -> Result<()> {
        self.check(at)?;
        if self.cells[self.index(at)] == CellRole::Wall || self.start == Some(at) {
            return Err(MutationError::CellOccupied(at));
        }
        if let Some(old) = self.end.take() {
            let idx = self.index(old);
            self.cells[idx] = CellRole::Empty;
        }
        let idx = self.index(at);
        self.cells[idx] = CellRole::End;
        self.end = Some(at);
        Ok(())
    }

    /// Reset visited and path marks left by a previous search.
    pub fn clear_search(&mut self) {
        for cell in &mut self.cells {
            if matches!(cell, CellRole::Visited | CellRole::Path) {
                *cell = CellRole::Empty;
            }
        }
    }

    /// Mark a cell as settled by a search. Start and end keep their marker.
    pub fn mark_visited(&mut self, at: Coord) {
        self.mark(at, CellRole::Visited);
    }

    /// Mark a cell as part of the discovered path. Start and end keep their marker.
    pub fn mark_path(&mut self, at: Coord) {
        self.mark(at, CellRole::Path);
    }

    fn mark(&mut self, at: Coord, role: CellRole) {
        if self.in_bounds(at) && !self.is_marker(at) {
            let idx = self.index(at);
            self.cells[idx] = role;
        }
    }

    /// Whether a search may enter the cell.
    pub fn is_walkable(&self, at: Coord) -> bool {
        matches!(self.get(at), Some(role) if role != CellRole::Wall)
    }

    /// Walkable 4-neighbors in the order up, down, left, right.
    pub fn neighbors(&self, at: Coord) -> Vec<Coord> {
        let mut out = Vec::with_capacity(4);
        if at.row > 0 {
            out.push(Coord::new(at.row - 1, at.col));
        }
        if at.row + 1 < self.rows {
            out.push(Coord::new(at.row + 1, at.col));
        }
        if at.col > 0 {
            out.push(Coord::new(at.row, at.col - 1));
        }
        if at.col + 1 < self.cols {
            out.push(Coord::new(at.row, at.col + 1));
        }
        out.retain(|&c| self.is_walkable(c));
        out
    }

    /// Number of cells with the given role.
    pub fn count(&self, role: CellRole) -> usize {
        self.cells.iter().filter(|&&c| c == role).count()
    }
}
