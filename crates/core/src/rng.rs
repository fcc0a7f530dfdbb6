//! RNG module - flavor generation for spawned pieces
//!
//! The engine never reaches for a global random source. Spawned flavors come
//! from an injected [`FlavorSource`], so a seed (or a scripted sequence in tests)
//! fully determines a game.
//!
//! Provides a simple LCG for deterministic play and a scripted source for tests.

use crate::types::FlavorId;

/// Uniform generator over `[0, flavor_count)`
pub trait FlavorSource {
    /// Draw the next flavor. `flavor_count` is always at least 1.
    fn next_flavor(&mut self, flavor_count: u32) -> FlavorId;
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits of the state; the low bits of a power-of-two LCG have
    /// short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        let max = max.max(1);
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current RNG state (for restarting with the same sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FlavorSource for SimpleRng {
    fn next_flavor(&mut self, flavor_count: u32) -> FlavorId {
        self.next_range(flavor_count)
    }
}

/// Replays a fixed list of flavors, wrapping around when exhausted.
///
/// Values are reduced modulo `flavor_count`, so any list works with any catalog.
#[derive(Debug, Clone)]
pub struct ScriptedFlavors {
    flavors: Vec<FlavorId>,
    cursor: usize,
}

impl ScriptedFlavors {
    pub fn new(flavors: Vec<FlavorId>) -> Self {
        Self { flavors, cursor: 0 }
    }

    /// Number of flavors drawn so far
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl FlavorSource for ScriptedFlavors {
    fn next_flavor(&mut self, flavor_count: u32) -> FlavorId {
        if self.flavors.is_empty() {
            return 0;
        }
        let flavor = self.flavors[self.cursor % self.flavors.len()];
        self.cursor += 1;
        flavor % flavor_count.max(1)
    }
}

impl<S: FlavorSource + ?Sized> FlavorSource for Box<S> {
    fn next_flavor(&mut self, flavor_count: u32) -> FlavorId {
        (**self).next_flavor(flavor_count)
    }
}
