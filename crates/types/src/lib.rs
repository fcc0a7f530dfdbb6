//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be shared
//! by the simulation core, the presentation bridge, input translation and the
//! AI adapter protocol.
//!
//! # Grid Layout
//!
//! The board is a row-major grid of `width * height` cells:
//!
//! - **Index**: `index = y * width + x`
//! - **Rows**: `y = 0` is the bottom row, pieces fall towards lower `y`
//! - **Sentinel**: [`NO_CELL`] (`-1`) means "no cell", e.g. a pointer that left the grid
//!
//! # Default Configuration
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_WIDTH` | 8 | Columns |
//! | `DEFAULT_HEIGHT` | 8 | Rows |
//! | `DEFAULT_FLAVORS` | 5 | Size of the flavor catalog |
//! | `MIN_LINE_LEN` | 3 | Shortest clearable streak |
//! | `LINE_BASE_SCORE` | 100 | Points per cell beyond two in a line |
//!
//! # Animation Timing
//!
//! Nominal durations attached to animation jobs, in milliseconds:
//!
//! - `SWAP_ANIM_MS`: 200ms - two pieces trade places
//! - `CLEAR_ANIM_MS`: 200ms - cleared pieces shrink away
//! - `FILL_ANIM_MS`: 200ms - survivors drop and new pieces slide in
//!
//! # Examples
//!
//! ```
//! use match3_types::{Piece, SwapOperation, NO_CELL};
//!
//! let piece = Piece::new(2);
//! assert!(piece.active);
//! assert!(!piece.cleared().active);
//!
//! let op = SwapOperation::new(3, NO_CELL);
//! assert!(op.is_noop());
//! ```

/// Default board width (8 columns)
pub const DEFAULT_WIDTH: i32 = 8;

/// Default board height (8 rows)
pub const DEFAULT_HEIGHT: i32 = 8;

/// Default number of flavors
pub const DEFAULT_FLAVORS: i32 = 5;

/// Upper bound on resolution cycles while settling a fresh board
pub const DEFAULT_MAX_SETTLE_STEPS: u32 = 10_000;

/// Minimum streak length that forms a clearable line
pub const MIN_LINE_LEN: usize = 3;

/// Score unit: a line of length `n` scores `LINE_BASE_SCORE * (n - 2)`
pub const LINE_BASE_SCORE: u32 = 100;

/// Fixed timestep interval for the reference game loop (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Swap animation duration
pub const SWAP_ANIM_MS: u32 = 200;

/// Clear animation duration
pub const CLEAR_ANIM_MS: u32 = 200;

/// Column fill animation duration
pub const FILL_ANIM_MS: u32 = 200;

/// Row-major cell index. Valid values are `0..width*height`.
pub type CellIndex = i32;

/// "No cell" sentinel. Every board operation treats it as a no-op.
pub const NO_CELL: CellIndex = -1;

/// Opaque piece-type identifier, an index into an external flavor catalog.
pub type FlavorId = u32;

/// A board cell's game data.
///
/// `active == false` means the cell is vacant. A vacant cell keeps its stale
/// flavor, which is never read by matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Piece {
    pub flavor: FlavorId,
    pub active: bool,
}

impl Piece {
    /// Create an active piece of the given flavor
    pub fn new(flavor: FlavorId) -> Self {
        Self {
            flavor,
            active: true,
        }
    }

    /// A vacant cell
    pub fn empty() -> Self {
        Self {
            flavor: 0,
            active: false,
        }
    }

    /// Same flavor, marked inactive
    pub fn cleared(self) -> Self {
        Self {
            active: false,
            ..self
        }
    }
}

/// Scan axis of a clear line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left-to-right along a row (stride 1)
    Row,
    /// Bottom-to-top along a column (stride `width`)
    Column,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Row => "row",
            Axis::Column => "column",
        }
    }
}

/// A run of at least [`MIN_LINE_LEN`] same-flavor active cells along one axis.
///
/// Cells are listed in scan order (ascending index).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClearLine {
    pub axis: Axis,
    pub flavor: FlavorId,
    pub cells: Vec<CellIndex>,
}

impl ClearLine {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: CellIndex) -> bool {
        self.cells.contains(&cell)
    }
}

/// Pairwise exchange of game data between two cells.
///
/// Commutative; a no-op if either index is [`NO_CELL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapOperation {
    pub source: CellIndex,
    pub target: CellIndex,
}

impl SwapOperation {
    pub fn new(source: CellIndex, target: CellIndex) -> Self {
        Self { source, target }
    }

    pub fn is_noop(&self) -> bool {
        self.source == NO_CELL || self.target == NO_CELL
    }
}

/// Compaction of one column.
///
/// `swaps` move surviving pieces down, bottom-to-top. `spawned` lists the flavors
/// generated for the vacated top cells, bottom-to-top.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ColumnShiftResult {
    pub column: i32,
    pub swaps: Vec<SwapOperation>,
    pub spawned: Vec<FlavorId>,
}

impl ColumnShiftResult {
    /// Number of rows the topmost survivor (and every spawned piece) travels
    pub fn drop_distance(&self) -> usize {
        self.spawned.len()
    }
}

/// One resolution cycle: what was cleared and how columns were refilled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StepResult {
    /// Deduplicated cleared cells, ascending
    pub cleared: Vec<CellIndex>,
    /// One entry per affected column, ascending by column
    pub shifts: Vec<ColumnShiftResult>,
    /// Lines found in this cycle (overlapping lines are kept separate)
    pub lines: Vec<ClearLine>,
    /// Points awarded for this cycle
    pub score: u32,
}

/// Engine resolution phase.
///
/// A cascade resolves inside a single `request_swap` call, so `Resolving` is
/// only visible from within that call. Anything read between calls (snapshots,
/// observations) is always `Idle`; animation progress is tracked by the job
/// counts instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Board at rest, ready for a swap request
    #[default]
    Idle,
    /// A cascade is being computed
    Resolving,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Resolving => "resolving",
        }
    }
}

/// Already-resolved pointer input, expressed in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer pressed over a cell ([`NO_CELL`] if outside the grid)
    PointerDown(CellIndex),
    /// Pointer released over a cell ([`NO_CELL`] if outside the grid)
    PointerUp(CellIndex),
}

/// A swap as requested by a player or controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapRequest {
    pub source: CellIndex,
    pub target: CellIndex,
}

impl SwapRequest {
    pub fn new(source: CellIndex, target: CellIndex) -> Self {
        Self { source, target }
    }
}

/// Why a swap request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapRejection {
    /// An index is [`NO_CELL`] or outside the grid
    InvalidIndex,
    /// Both indices name the same cell
    SameCell,
    /// The cells do not share an edge
    NotAdjacent,
    /// One of the cells is vacant
    InactiveCell,
    /// The swap would not form a line through either cell
    NoMatch,
}

impl SwapRejection {
    /// Convert to snake_case string for the AI protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapRejection::InvalidIndex => "invalid_index",
            SwapRejection::SameCell => "same_cell",
            SwapRejection::NotAdjacent => "not_adjacent",
            SwapRejection::InactiveCell => "inactive_cell",
            SwapRejection::NoMatch => "no_match",
        }
    }

    /// Whether the rejected swap is still worth showing as a there-and-back animation
    pub fn is_animated(&self) -> bool {
        matches!(self, SwapRejection::NoMatch)
    }
}
