use crate::board::Board;
use crate::types::{FlavorId, Phase};

/// FNV-1a 64-bit over a byte stream.
///
/// Stable across Rust versions and platforms, unlike `DefaultHasher`.
pub fn fnv1a64(bytes: impl IntoIterator<Item = u8>) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x00000100000001B3);
    }
    h
}

/// Hash of a board's game data: dimensions, then every cell's flavor and active flag
pub fn board_hash(board: &Board) -> u64 {
    let dims = [board.width(), board.height()]
        .into_iter()
        .flat_map(|v| v.to_le_bytes());
    let cells = board.cells().iter().flat_map(|p| {
        let [a, b, c, d] = p.flavor.to_le_bytes();
        [a, b, c, d, p.active as u8]
    });
    fnv1a64(dims.chain(cells))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GameSnapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major flavors, row 0 (bottom) first
    pub flavors: Vec<FlavorId>,
    pub board_hash: u64,
    /// Always [`Phase::Idle`] between engine calls
    pub phase: Phase,
    pub episode_id: u32,
    pub seed: u32,
    pub score: u32,
    pub moves: u32,
    pub cascade_steps: u32,
    pub pending_jobs: usize,
    pub running_jobs: usize,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.width = 0;
        self.height = 0;
        self.flavors.clear();
        self.board_hash = 0;
        self.phase = Phase::Idle;
        self.episode_id = 0;
        self.seed = 0;
        self.score = 0;
        self.moves = 0;
        self.cascade_steps = 0;
        self.pending_jobs = 0;
        self.running_jobs = 0;
    }

    /// Flavor at (x, y), `None` if out of range
    pub fn flavor_at(&self, x: i32, y: i32) -> Option<FlavorId> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        self.flavors.get((y * self.width + x) as usize).copied()
    }

    /// Whether the presentation layer has caught up with the board
    pub fn animations_idle(&self) -> bool {
        self.pending_jobs == 0 && self.running_jobs == 0
    }
}
