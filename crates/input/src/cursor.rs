//! Keyboard cursor.
//!
//! Terminals have no pointer over the grid, so a cursor stands in for one:
//! selecting presses the pointer at the cursor, selecting again releases it.
//! Coordinates follow the board, with `y = 0` on the bottom row.

use arrayvec::ArrayVec;

use crate::types::{CellIndex, InputEvent};

/// Cursor intent decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorCommand {
    /// Move the cursor by one cell
    Move { dx: i32, dy: i32 },
    /// Press at the cursor, or release if already pressed
    Select,
    /// Press at the cursor and release on the neighbor in one go
    SwapToward { dx: i32, dy: i32 },
    /// Release off the grid, abandoning a selection
    Cancel,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    held: Option<CellIndex>,
}

impl Cursor {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width.max(1),
            height: height.max(1),
            held: None,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn cell(&self) -> CellIndex {
        self.y * self.width + self.x
    }

    pub fn held(&self) -> Option<CellIndex> {
        self.held
    }

    fn cell_at(&self, x: i32, y: i32) -> Option<CellIndex> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Apply a command, returning the pointer events it produces.
    ///
    /// Moves clamp at the grid edges and never produce events.
    pub fn apply(&mut self, command: CursorCommand) -> ArrayVec<InputEvent, 2> {
        let mut out = ArrayVec::new();
        match command {
            CursorCommand::Move { dx, dy } => {
                self.x = (self.x + dx).clamp(0, self.width - 1);
                self.y = (self.y + dy).clamp(0, self.height - 1);
            }
            CursorCommand::Select => match self.held.take() {
                Some(_) => out.push(InputEvent::PointerUp(self.cell())),
                None => {
                    self.held = Some(self.cell());
                    out.push(InputEvent::PointerDown(self.cell()));
                }
            },
            CursorCommand::SwapToward { dx, dy } => {
                if let Some(target) = self.cell_at(self.x + dx, self.y + dy) {
                    self.held = None;
                    out.push(InputEvent::PointerDown(self.cell()));
                    out.push(InputEvent::PointerUp(target));
                    self.x += dx;
                    self.y += dy;
                }
            }
            CursorCommand::Cancel => {
                if self.held.take().is_some() {
                    out.push(InputEvent::PointerUp(crate::types::NO_CELL));
                }
            }
            CursorCommand::Restart => {
                self.held = None;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::SwapGesture;
    use crate::types::{SwapRequest, NO_CELL};

    #[test]
    fn test_move_clamps() {
        let mut c = Cursor::new(8, 8);
        assert!(c.apply(CursorCommand::Move { dx: -1, dy: -1 }).is_empty());
        assert_eq!(c.position(), (0, 0));
        for _ in 0..20 {
            c.apply(CursorCommand::Move { dx: 1, dy: 1 });
        }
        assert_eq!(c.position(), (7, 7));
        assert_eq!(c.cell(), 63);
    }

    #[test]
    fn test_select_twice_is_press_release() {
        let mut c = Cursor::new(8, 8);
        let mut g = SwapGesture::new();

        let ev = c.apply(CursorCommand::Select);
        assert_eq!(ev.as_slice(), &[InputEvent::PointerDown(0)]);
        assert_eq!(c.held(), Some(0));
        for e in ev {
            assert_eq!(g.handle(e), None);
        }

        c.apply(CursorCommand::Move { dx: 0, dy: 1 });
        let ev = c.apply(CursorCommand::Select);
        assert_eq!(ev.as_slice(), &[InputEvent::PointerUp(8)]);
        let reqs: Vec<_> = ev.into_iter().filter_map(|e| g.handle(e)).collect();
        assert_eq!(reqs, vec![SwapRequest::new(0, 8)]);
    }

    #[test]
    fn test_swap_toward() {
        let mut c = Cursor::new(4, 4);
        let ev = c.apply(CursorCommand::SwapToward { dx: 1, dy: 0 });
        assert_eq!(
            ev.as_slice(),
            &[InputEvent::PointerDown(0), InputEvent::PointerUp(1)]
        );
        assert_eq!(c.position(), (1, 0));

        // Off the left edge: nothing.
        let mut c = Cursor::new(4, 4);
        assert!(c.apply(CursorCommand::SwapToward { dx: -1, dy: 0 }).is_empty());
    }

    #[test]
    fn test_cancel_releases_off_grid() {
        let mut c = Cursor::new(4, 4);
        let mut g = SwapGesture::new();
        for e in c.apply(CursorCommand::Select) {
            g.handle(e);
        }
        let ev = c.apply(CursorCommand::Cancel);
        assert_eq!(ev.as_slice(), &[InputEvent::PointerUp(NO_CELL)]);
        assert_eq!(g.handle(ev[0]), None);
        assert!(c.apply(CursorCommand::Cancel).is_empty());
    }
}
