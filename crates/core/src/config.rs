//! Game configuration
//!
//! Defaults are an 8x8 board with five flavors. Every field can be
//! overridden from the environment:
//!
//! - `MATCH3_WIDTH`, `MATCH3_HEIGHT`: grid dimensions
//! - `MATCH3_FLAVORS`: size of the flavor catalog
//! - `MATCH3_SEED`: RNG seed
//! - `MATCH3_MAX_SETTLE_STEPS`: bound on cycles while settling a fresh board
//!
//! Unparseable values fall back to defaults. Parseable but malformed values
//! (e.g. a zero width) are caught by [`GameConfig::validate`].

use crate::error::ConfigError;
use crate::types::{DEFAULT_FLAVORS, DEFAULT_HEIGHT, DEFAULT_MAX_SETTLE_STEPS, DEFAULT_WIDTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub flavor_count: i32,
    pub seed: u32,
    pub max_settle_steps: u32,
    /// Enqueue a there-and-back animation for adjacent swaps that form no line
    pub animate_rejected_swaps: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            flavor_count: DEFAULT_FLAVORS,
            seed: 1,
            max_settle_steps: DEFAULT_MAX_SETTLE_STEPS,
            animate_rejected_swaps: true,
        }
    }
}

impl GameConfig {
    pub fn new(width: i32, height: i32, flavor_count: i32, seed: u32) -> Self {
        Self {
            width,
            height,
            flavor_count,
            seed,
            ..Self::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            env::var(key).ok().and_then(|s| s.trim().parse().ok())
        }

        let defaults = Self::default();
        Self {
            width: parsed("MATCH3_WIDTH").unwrap_or(defaults.width),
            height: parsed("MATCH3_HEIGHT").unwrap_or(defaults.height),
            flavor_count: parsed("MATCH3_FLAVORS").unwrap_or(defaults.flavor_count),
            seed: parsed("MATCH3_SEED").unwrap_or(defaults.seed),
            max_settle_steps: parsed("MATCH3_MAX_SETTLE_STEPS")
                .unwrap_or(defaults.max_settle_steps),
            animate_rejected_swaps: defaults.animate_rejected_swaps,
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_animate_rejected_swaps(mut self, enabled: bool) -> Self {
        self.animate_rejected_swaps = enabled;
        self
    }

    /// Reject dimensions and catalog sizes that would make grid arithmetic undefined
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimensions(self.width, self.height)?;
        if self.flavor_count < 1 {
            return Err(ConfigError::InvalidFlavorCount(self.flavor_count));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}

pub(crate) fn validate_dimensions(width: i32, height: i32) -> Result<(), ConfigError> {
    if width <= 0 {
        return Err(ConfigError::InvalidWidth(width));
    }
    if height <= 0 {
        return Err(ConfigError::InvalidHeight(height));
    }
    // Every index must be representable as a `CellIndex`.
    if width.checked_mul(height).is_none() {
        return Err(ConfigError::TooLarge { width, height });
    }
    Ok(())
}
