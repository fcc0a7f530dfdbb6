//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the match-3 rules and the resolution state machine.
//! It has **no dependencies** on rendering, input devices, networking or I/O:
//!
//! - **Deterministic**: the same seed (or scripted flavor source) replays the same game
//! - **Synchronous**: every swap resolves its full cascade before returning
//! - **Replayable**: each resolution cycle is described by an immutable [`StepResult`]
//! - **Decoupled**: animation is gated through an [`OperationQueue`] and never
//!   touches game data
//!
//! # Module Structure
//!
//! - [`board`]: row-major grid with bounds, adjacency and swap primitives
//! - [`matcher`]: row and column scans for runs of three or more
//! - [`gravity`]: per-column compaction and top refill
//! - [`validator`]: speculative swap with automatic revert
//! - [`cascade`]: the match → clear → shift loop
//! - [`scoring`]: `100 * (len - 2)` per line
//! - [`queue`]: FIFO of animation jobs with per-cell locks
//! - [`game`]: the engine facade
//! - [`rng`]: injectable flavor sources
//! - [`snapshot`]: flat state export for observers
//!
//! # Game Rules
//!
//! - A swap is legal only between edge-adjacent active cells, and only if it
//!   forms a line through one of them. Illegal swaps are reverted.
//! - Every line of three or more same-flavor pieces in a row or column clears.
//!   Overlapping lines clear together but score separately.
//! - Survivors fall straight down; the vacated top of each column is refilled
//!   with random flavors. Repeat until nothing matches.
//!
//! # Example
//!
//! ```
//! use match3_core::{Game, GameConfig};
//! use match3_core::matcher::find_clearable_lines;
//!
//! let mut game = Game::initialize(GameConfig::default()).unwrap();
//! assert!(find_clearable_lines(game.board()).is_empty());
//!
//! // Play the first legal move, if any
//! if let Some(m) = game.legal_moves().first().copied() {
//!     let outcome = game.request_swap(m.source, m.target);
//!     assert!(outcome.accepted);
//!     assert!(!outcome.cascade.is_empty());
//!     assert!(game.score() >= 100);
//! }
//!
//! // Non-adjacent swaps are refused and change nothing
//! let before = game.board().clone();
//! assert!(!game.request_swap(0, 10).accepted);
//! assert_eq!(game.board(), &before);
//! ```

pub mod board;
pub mod cascade;
pub mod config;
pub mod error;
pub mod game;
pub mod gravity;
pub mod matcher;
pub mod queue;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod validator;

pub use match3_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use cascade::{settle, step, Cascade};
pub use config::GameConfig;
pub use error::{ConfigError, EngineError};
pub use game::{Game, SwapOutcome};
pub use matcher::find_clearable_lines;
pub use queue::{AnimationJob, JobId, JobKind, OperationQueue};
pub use rng::{FlavorSource, ScriptedFlavors, SimpleRng};
pub use scoring::{cycle_score, line_score};
pub use snapshot::GameSnapshot;
pub use types::StepResult;
