//! Error types raised by the engine.

use thiserror::Error;

/// Rejected board configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board width must be positive, got {0}")]
    InvalidWidth(i32),

    #[error("board height must be positive, got {0}")]
    InvalidHeight(i32),

    #[error("flavor count must be at least 1, got {0}")]
    InvalidFlavorCount(i32),

    #[error("board of {width}x{height} cells does not fit a cell index")]
    TooLarge { width: i32, height: i32 },

    #[error("flavor list has {actual} entries, expected {expected}")]
    FlavorListSize { expected: usize, actual: usize },

    #[error("board is {actual_width}x{actual_height}, configuration expects {width}x{height}")]
    BoardMismatch {
        width: i32,
        height: i32,
        actual_width: i32,
        actual_height: i32,
    },

    #[error("flavor {flavor} is outside the catalog of {flavor_count}")]
    FlavorOutOfRange { flavor: u32, flavor_count: i32 },
}

/// Errors surfaced by [`crate::Game`] construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("board did not settle within {steps} resolution steps")]
    Unsettleable { steps: u32 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
