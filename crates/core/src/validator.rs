//! Move validator - speculative swap with automatic revert
//!
//! A swap is legal iff, once applied, at least one clearable line passes through
//! the source or the target. Requests that name a missing, identical, distant or
//! vacant cell are refused before the board is touched.

use crate::board::Board;
use crate::matcher::find_clearable_lines;
use crate::types::{CellIndex, SwapRejection, SwapRequest};

/// Checks that do not require touching the board
pub fn precheck(board: &Board, a: CellIndex, b: CellIndex) -> Result<(), SwapRejection> {
    if !board.contains(a) || !board.contains(b) {
        return Err(SwapRejection::InvalidIndex);
    }
    if a == b {
        return Err(SwapRejection::SameCell);
    }
    if !board.are_adjacent(a, b) {
        return Err(SwapRejection::NotAdjacent);
    }
    if !board.is_active(a) || !board.is_active(b) {
        return Err(SwapRejection::InactiveCell);
    }
    Ok(())
}

/// Apply the swap if it forms a line through either cell.
///
/// On `Err` the board is exactly as it was before the call.
pub fn try_swap(board: &mut Board, a: CellIndex, b: CellIndex) -> Result<(), SwapRejection> {
    precheck(board, a, b)?;

    board.swap(a, b);
    let forms_line = find_clearable_lines(board)
        .iter()
        .any(|l| l.contains(a) || l.contains(b));

    if !forms_line {
        board.swap(a, b);
        return Err(SwapRejection::NoMatch);
    }
    Ok(())
}

/// Every legal swap on the board, each pair once with the lower index first.
///
/// Each candidate is applied and reverted in place; the board is unchanged on return.
pub fn legal_swaps(board: &mut Board) -> Vec<SwapRequest> {
    let mut out = Vec::new();
    for a in 0..board.len() as CellIndex {
        let Some((x, y)) = board.coords_of(a) else {
            continue;
        };
        for (dx, dy) in [(1, 0), (0, 1)] {
            let Some(b) = board.cell_index_of(x + dx, y + dy) else {
                continue;
            };
            if try_swap(board, a, b).is_ok() {
                board.swap(a, b);
                out.push(SwapRequest::new(a, b));
            }
        }
    }
    out
}
