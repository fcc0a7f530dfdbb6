//! Press/release pairing.
//!
//! A press records the source cell; the next release names the target and
//! produces at most one request. Adjacency is left to the engine, which
//! rejects distant pairs anyway.

use crate::types::{CellIndex, InputEvent, SwapRequest, NO_CELL};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapGesture {
    pending: Option<CellIndex>,
}

impl SwapGesture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `cell` as the swap source, replacing any earlier press
    pub fn pointer_down(&mut self, cell: CellIndex) {
        self.pending = Some(cell);
    }

    /// Complete the gesture.
    ///
    /// Returns `None` without a prior press, when either end is off the grid,
    /// or when the pointer was released over the cell it was pressed on.
    pub fn pointer_up(&mut self, cell: CellIndex) -> Option<SwapRequest> {
        let source = self.pending.take()?;
        if source == NO_CELL || cell == NO_CELL || source == cell {
            return None;
        }
        Some(SwapRequest::new(source, cell))
    }

    pub fn handle(&mut self, event: InputEvent) -> Option<SwapRequest> {
        match event {
            InputEvent::PointerDown(cell) => {
                self.pointer_down(cell);
                None
            }
            InputEvent::PointerUp(cell) => self.pointer_up(cell),
        }
    }

    pub fn pending(&self) -> Option<CellIndex> {
        self.pending
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
