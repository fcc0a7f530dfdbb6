//! Scoring module
//!
//! A line of length `n` scores `100 * (n - 2)`: 100 for three, 200 for four.
//! A cycle's score is the sum over every line found in it. Overlapping lines
//! (cross, T and L shapes) each count in full.

use crate::types::{ClearLine, LINE_BASE_SCORE, MIN_LINE_LEN};

/// Points for one line of `len` cells
pub fn line_score(len: usize) -> u32 {
    if len < MIN_LINE_LEN {
        return 0;
    }
    LINE_BASE_SCORE.saturating_mul((len - 2) as u32)
}

/// Points for every line found in one resolution cycle
pub fn cycle_score(lines: &[ClearLine]) -> u32 {
    lines
        .iter()
        .fold(0u32, |acc, l| acc.saturating_add(line_score(l.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;

    fn line(len: usize) -> ClearLine {
        ClearLine {
            axis: Axis::Row,
            flavor: 0,
            cells: (0..len as i32).collect(),
        }
    }

    #[test]
    fn test_line_scores() {
        assert_eq!(line_score(0), 0);
        assert_eq!(line_score(2), 0);
        assert_eq!(line_score(3), 100);
        assert_eq!(line_score(4), 200);
        assert_eq!(line_score(5), 300);
    }

    #[test]
    fn test_cycle_score_sums_lines() {
        assert_eq!(cycle_score(&[]), 0);
        assert_eq!(cycle_score(&[line(4)]), 200);
        assert_eq!(cycle_score(&[line(3), line(3)]), 200);
        assert_eq!(cycle_score(&[line(3), line(5)]), 400);
    }
}
