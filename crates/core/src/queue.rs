//! Operation queue - FIFO of animation jobs gated by per-cell locks
//!
//! Board data changes immediately; the animation that shows it happens later.
//! Each job names the cells it will move or scale. A job may only start once
//! none of its cells is held by a running job, and it holds them until the
//! presentation layer reports it complete.
//!
//! The queue drains strictly in order: if the head job is blocked, nothing
//! behind it starts either. Blocking is the only source of latency.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::types::{
    CellIndex, ColumnShiftResult, CLEAR_ANIM_MS, FILL_ANIM_MS, SWAP_ANIM_MS,
};

/// Monotonic job identifier
pub type JobId = u64;

/// What an animation job shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    /// Two pieces trade places
    Swap { a: CellIndex, b: CellIndex },
    /// Two pieces trade places and back again (a swap that formed no line)
    SwapRevert { a: CellIndex, b: CellIndex },
    /// Cleared pieces shrink away
    Clear { cells: Vec<CellIndex> },
    /// Survivors drop and new pieces slide in from above
    Fill { shifts: Vec<ColumnShiftResult> },
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Swap { .. } => "swap",
            JobKind::SwapRevert { .. } => "swap_revert",
            JobKind::Clear { .. } => "clear",
            JobKind::Fill { .. } => "fill",
        }
    }

    /// Nominal duration of the animation
    pub fn duration_ms(&self) -> u32 {
        match self {
            JobKind::Swap { .. } => SWAP_ANIM_MS,
            // There and back.
            JobKind::SwapRevert { .. } => SWAP_ANIM_MS * 2,
            JobKind::Clear { .. } => CLEAR_ANIM_MS,
            JobKind::Fill { .. } => FILL_ANIM_MS,
        }
    }
}

/// A queued or running animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationJob {
    pub id: JobId,
    pub kind: JobKind,
    /// Cells locked while the job runs, ascending and deduplicated
    pub cells: Vec<CellIndex>,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Default)]
pub struct OperationQueue {
    pending: VecDeque<AnimationJob>,
    running: BTreeMap<JobId, Vec<CellIndex>>,
    locks: HashMap<CellIndex, JobId>,
    next_id: JobId,
}

impl OperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job; returns its id
    pub fn enqueue(&mut self, kind: JobKind, mut cells: Vec<CellIndex>) -> JobId {
        cells.sort_unstable();
        cells.dedup();

        self.next_id = self.next_id.wrapping_add(1);
        let id = self.next_id;
        let duration_ms = kind.duration_ms();
        self.pending.push_back(AnimationJob {
            id,
            kind,
            cells,
            duration_ms,
        });
        id
    }

    /// Start the head job if none of its cells is locked.
    ///
    /// Returns `None` when the queue is empty or the head is blocked. Never skips
    /// ahead of a blocked job.
    pub fn drain(&mut self) -> Option<AnimationJob> {
        let head = self.pending.front()?;
        if head.cells.iter().any(|c| self.locks.contains_key(c)) {
            return None;
        }

        let job = self.pending.pop_front()?;
        for &cell in &job.cells {
            self.locks.insert(cell, job.id);
        }
        self.running.insert(job.id, job.cells.clone());
        Some(job)
    }

    /// Release a running job's cells. Unknown or already completed ids return false.
    pub fn report_complete(&mut self, id: JobId) -> bool {
        let Some(cells) = self.running.remove(&id) else {
            return false;
        };
        for cell in cells {
            if self.locks.get(&cell) == Some(&id) {
                self.locks.remove(&cell);
            }
        }
        true
    }

    /// Whether a running job holds `cell`
    pub fn is_locked(&self, cell: CellIndex) -> bool {
        self.locks.contains_key(&cell)
    }

    /// True if jobs are waiting but the head cannot start yet
    pub fn is_blocked(&self) -> bool {
        self.pending
            .front()
            .is_some_and(|head| head.cells.iter().any(|c| self.locks.contains_key(c)))
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn running_len(&self) -> usize {
        self.running.len()
    }

    /// Nothing queued and nothing running
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.running.is_empty()
    }

    /// Queued jobs, head first
    pub fn pending(&self) -> impl Iterator<Item = &AnimationJob> {
        self.pending.iter()
    }
}
