//! Input module (engine-facing).
//!
//! Turns player intent into [`types::SwapRequest`]s without knowing anything
//! about the board beyond its dimensions:
//!
//! - [`gesture`]: pairs a pointer press with its release
//! - [`cursor`]: a keyboard-driven cursor that emits pointer events
//! - [`map`]: `crossterm` key events to cursor commands

pub mod cursor;
pub mod gesture;
pub mod map;

pub use match3_types as types;

pub use cursor::{Cursor, CursorCommand};
pub use gesture::SwapGesture;
pub use map::{handle_key_event, should_quit};
