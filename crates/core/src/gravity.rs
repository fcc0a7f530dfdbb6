//! Gravity resolver - compacts columns and spawns replacement pieces
//!
//! A column is processed bottom-to-top in a single pass. Each surviving piece
//! that has vacant cells below it is swapped straight down by the number of
//! vacancies seen so far, so a target is always vacant when written. The
//! vacated top cells are then refilled bottom-to-top from the flavor source.

use crate::board::Board;
use crate::rng::FlavorSource;
use crate::types::{CellIndex, ColumnShiftResult, Piece, SwapOperation};

/// Compact column `x` and refill its top. Out-of-range columns yield an empty result.
pub fn shift_column<S: FlavorSource + ?Sized>(
    board: &mut Board,
    x: i32,
    source: &mut S,
    flavor_count: u32,
) -> ColumnShiftResult {
    let mut result = ColumnShiftResult {
        column: x,
        ..ColumnShiftResult::default()
    };
    if x < 0 || x >= board.width() {
        return result;
    }

    let (w, h) = (board.width(), board.height());
    let mut empty_count = 0;

    for y in 0..h {
        let index = x + w * y;
        if !board.is_active(index) {
            empty_count += 1;
            continue;
        }
        if empty_count == 0 {
            continue;
        }

        let target = index - w * empty_count;
        board.swap(index, target);
        result.swaps.push(SwapOperation::new(index, target));
    }

    for y in (h - empty_count)..h {
        let flavor = source.next_flavor(flavor_count);
        board.set(x + w * y, Piece::new(flavor));
        result.spawned.push(flavor);
    }

    result
}

/// Ascending, deduplicated columns containing at least one of `cells`
pub fn affected_columns(board: &Board, cells: &[CellIndex]) -> Vec<i32> {
    let mut columns: Vec<i32> = cells.iter().filter_map(|&c| board.column_of(c)).collect();
    columns.sort_unstable();
    columns.dedup();
    columns
}
