//! Board module - manages the game grid
//!
//! The board is a `width x height` grid where each cell holds a [`Piece`].
//! Uses a flat vector in row-major order (`y * width + x`), with `y = 0` at the
//! bottom. Pieces fall towards lower `y`.
//!
//! Every index-taking operation treats [`NO_CELL`](crate::types::NO_CELL) and any
//! other out-of-range index as a no-op rather than a fault.

use arrayvec::ArrayVec;

use crate::config::validate_dimensions;
use crate::error::ConfigError;
use crate::rng::FlavorSource;
use crate::types::{CellIndex, FlavorId, Piece};

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: i32,
    height: i32,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Piece>,
}

impl Board {
    /// Create a board with every cell vacant
    pub fn new(width: i32, height: i32) -> Result<Self, ConfigError> {
        validate_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Piece::empty(); (width * height) as usize],
        })
    }

    /// Create a fully active board from row-major flavors (row 0 first)
    pub fn from_flavors(width: i32, height: i32, flavors: &[FlavorId]) -> Result<Self, ConfigError> {
        let mut board = Self::new(width, height)?;
        if flavors.len() != board.cells.len() {
            return Err(ConfigError::FlavorListSize {
                expected: board.cells.len(),
                actual: flavors.len(),
            });
        }
        for (cell, &flavor) in board.cells.iter_mut().zip(flavors) {
            *cell = Piece::new(flavor);
        }
        Ok(board)
    }

    /// Fill every cell with a fresh active piece, row 0 first
    pub fn fill_random<S: FlavorSource + ?Sized>(&mut self, source: &mut S, flavor_count: u32) {
        for cell in &mut self.cells {
            *cell = Piece::new(source.next_flavor(flavor_count));
        }
    }

    /// Map an index to its slot, rejecting the sentinel and anything out of range
    #[inline(always)]
    fn slot(&self, index: CellIndex) -> Option<usize> {
        if index < 0 || index >= self.width * self.height {
            return None;
        }
        Some(index as usize)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `index` names a cell on this board
    pub fn contains(&self, index: CellIndex) -> bool {
        self.slot(index).is_some()
    }

    /// Calculate flat index from (x, y) coordinates
    pub fn cell_index_of(&self, x: i32, y: i32) -> Option<CellIndex> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Inverse of [`Board::cell_index_of`]
    pub fn coords_of(&self, index: CellIndex) -> Option<(i32, i32)> {
        self.slot(index)?;
        Some((index % self.width, index / self.width))
    }

    /// True iff both cells exist, differ, and share an edge
    pub fn are_adjacent(&self, a: CellIndex, b: CellIndex) -> bool {
        let (Some((ax, ay)), Some((bx, by))) = (self.coords_of(a), self.coords_of(b)) else {
            return false;
        };
        // Same row and neighbouring columns, or same column and neighbouring rows.
        (ay == by && (ax - bx).abs() == 1) || (ax == bx && (ay - by).abs() == 1)
    }

    /// Edge neighbours of a cell: below, left, right, above (those that exist)
    pub fn neighbors(&self, index: CellIndex) -> ArrayVec<CellIndex, 4> {
        let mut out = ArrayVec::new();
        let Some((x, y)) = self.coords_of(index) else {
            return out;
        };
        for (dx, dy) in [(0, -1), (-1, 0), (1, 0), (0, 1)] {
            if let Some(n) = self.cell_index_of(x + dx, y + dy) {
                out.push(n);
            }
        }
        out
    }

    /// Get piece at `index`; `None` if out of range
    pub fn get(&self, index: CellIndex) -> Option<Piece> {
        self.slot(index).map(|slot| self.cells[slot])
    }

    /// Set piece at `index`; returns false if out of range
    pub fn set(&mut self, index: CellIndex, piece: Piece) -> bool {
        match self.slot(index) {
            Some(slot) => {
                self.cells[slot] = piece;
                true
            }
            None => false,
        }
    }

    /// Mark a cell vacant; returns false if out of range
    pub fn set_empty(&mut self, index: CellIndex) -> bool {
        match self.slot(index) {
            Some(slot) => {
                self.cells[slot].active = false;
                true
            }
            None => false,
        }
    }

    /// Whether the cell exists and holds an active piece
    pub fn is_active(&self, index: CellIndex) -> bool {
        matches!(self.get(index), Some(p) if p.active)
    }

    /// Exchange the game data of two cells.
    ///
    /// No-op (returns false) if either index is out of range.
    pub fn swap(&mut self, a: CellIndex, b: CellIndex) -> bool {
        match (self.slot(a), self.slot(b)) {
            (Some(a), Some(b)) => {
                self.cells.swap(a, b);
                true
            }
            _ => false,
        }
    }

    /// Whether every cell is active (the rest-state invariant)
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|p| p.active)
    }

    /// Column index of a cell
    pub fn column_of(&self, index: CellIndex) -> Option<i32> {
        self.coords_of(index).map(|(x, _)| x)
    }

    /// Get a reference to the internal cells
    pub fn cells(&self) -> &[Piece] {
        &self.cells
    }

    /// Row-major flavors, with vacant cells reported as `None`
    pub fn flavors(&self) -> impl Iterator<Item = Option<FlavorId>> + '_ {
        self.cells.iter().map(|p| p.active.then_some(p.flavor))
    }

    /// Write row-major flavors into `out`, reusing its allocation
    pub fn write_flavors(&self, out: &mut Vec<FlavorId>) {
        out.clear();
        out.extend(self.cells.iter().map(|p| p.flavor));
    }
}
