//! Line matcher - finds runs of three or more same-flavor pieces
//!
//! Every column is scanned bottom-to-top, then every row left-to-right. A cell
//! that sits in both a row run and a column run (cross, T and L shapes) shows up
//! in two separate [`ClearLine`]s; deduplication only happens in [`clear_set`].

use crate::board::Board;
use crate::types::{Axis, CellIndex, ClearLine, FlavorId, MIN_LINE_LEN};

/// Scan the whole board for clearable lines.
///
/// Column lines come first (by column), then row lines (by row).
pub fn find_clearable_lines(board: &Board) -> Vec<ClearLine> {
    let mut lines = Vec::new();
    let (w, h) = (board.width(), board.height());

    for x in 0..w {
        scan(board, x, w, h, Axis::Column, &mut lines);
    }
    for y in 0..h {
        scan(board, y * w, 1, w, Axis::Row, &mut lines);
    }

    lines
}

/// Whether any clearable line exists
pub fn has_clearable_lines(board: &Board) -> bool {
    !find_clearable_lines(board).is_empty()
}

/// Scan `length` cells starting at `start`, stepping by `stride`.
fn scan(
    board: &Board,
    start: CellIndex,
    stride: i32,
    length: i32,
    axis: Axis,
    out: &mut Vec<ClearLine>,
) {
    let mut streak: Vec<CellIndex> = Vec::new();
    let mut streak_flavor: FlavorId = 0;

    for i in 0..length {
        let index = start + i * stride;
        let Some(piece) = board.get(index) else {
            continue;
        };

        // A vacant cell or a flavor change breaks the streak.
        if !streak.is_empty() && (!piece.active || piece.flavor != streak_flavor) {
            flush(&mut streak, streak_flavor, axis, out);
        }

        if piece.active {
            streak_flavor = piece.flavor;
            streak.push(index);
        }
    }

    flush(&mut streak, streak_flavor, axis, out);
}

fn flush(streak: &mut Vec<CellIndex>, flavor: FlavorId, axis: Axis, out: &mut Vec<ClearLine>) {
    if streak.len() >= MIN_LINE_LEN {
        out.push(ClearLine {
            axis,
            flavor,
            cells: std::mem::take(streak),
        });
    } else {
        streak.clear();
    }
}

/// Deduplicated, ascending set of every cell in `lines`
pub fn clear_set(lines: &[ClearLine]) -> Vec<CellIndex> {
    let mut cells: Vec<CellIndex> = lines.iter().flat_map(|l| l.cells.iter().copied()).collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}

/// Lines that pass through `cell`
pub fn lines_touching(lines: &[ClearLine], cell: CellIndex) -> impl Iterator<Item = &ClearLine> {
    lines.iter().filter(move |l| l.contains(cell))
}
