//! Match-3 board engine (workspace facade crate).
//!
//! This package exposes `match3::{core,adapter,input,player,types}` while the
//! implementation lives in dedicated crates under `crates/`.

pub use match3_adapter as adapter;
pub use match3_core as core;
pub use match3_input as input;
pub use match3_player as player;
pub use match3_types as types;
