//! Step scheduler - drives match → clear → shift cycles until the board rests
//!
//! One call to [`step`] is one resolution cycle:
//!
//! 1. Find every clearable line. None means the board is at rest.
//! 2. Mark every cell of every line vacant (the deduplicated clear set).
//! 3. Run gravity on exactly the columns that lost a piece.
//! 4. Package cleared cells, column shifts, lines and score as a [`StepResult`].
//!
//! [`settle`] repeats this until no line remains. It is used both to settle a
//! freshly filled board and to resolve the cascade that follows a legal swap.

use tracing::trace;

use crate::board::Board;
use crate::gravity::{affected_columns, shift_column};
use crate::matcher::{clear_set, find_clearable_lines};
use crate::rng::FlavorSource;
use crate::scoring::cycle_score;
use crate::types::StepResult;

/// Run one resolution cycle. Returns `None` when the board is already at rest.
pub fn step<S: FlavorSource + ?Sized>(
    board: &mut Board,
    source: &mut S,
    flavor_count: u32,
) -> Option<StepResult> {
    let lines = find_clearable_lines(board);
    if lines.is_empty() {
        return None;
    }

    let cleared = clear_set(&lines);
    for &index in &cleared {
        board.set_empty(index);
    }

    let shifts = affected_columns(board, &cleared)
        .into_iter()
        .map(|x| shift_column(board, x, source, flavor_count))
        .collect();

    let score = cycle_score(&lines);
    trace!(lines = lines.len(), cleared = cleared.len(), score, "resolution step");

    Some(StepResult {
        cleared,
        shifts,
        lines,
        score,
    })
}

/// Ordered steps of one settle run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cascade {
    pub steps: Vec<StepResult>,
    /// False if the step limit was hit with lines still on the board
    pub settled: bool,
}

impl Cascade {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total points across every step
    pub fn score(&self) -> u32 {
        self.steps
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.score))
    }
}

/// Step until the board rests or `max_steps` cycles have run
pub fn settle<S: FlavorSource + ?Sized>(
    board: &mut Board,
    source: &mut S,
    flavor_count: u32,
    max_steps: u32,
) -> Cascade {
    let mut cascade = Cascade::default();

    while cascade.steps.len() < max_steps as usize {
        match step(board, source, flavor_count) {
            Some(result) => cascade.steps.push(result),
            None => {
                cascade.settled = true;
                return cascade;
            }
        }
    }

    cascade.settled = find_clearable_lines(board).is_empty();
    cascade
}
