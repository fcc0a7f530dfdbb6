//! Board tests - grid primitives and their invariants

use match3::core::{Board, SimpleRng};
use match3::types::{CellIndex, Piece, NO_CELL};

fn random_board(width: i32, height: i32, seed: u32) -> Board {
    let mut board = Board::new(width, height).unwrap();
    board.fill_random(&mut SimpleRng::new(seed), 5);
    board
}

#[test]
fn test_board_new_is_vacant() {
    let board = Board::new(8, 8).unwrap();
    assert_eq!(board.len(), 64);
    assert!(!board.is_full());
    for i in 0..64 {
        assert!(!board.is_active(i));
    }
}

#[test]
fn test_board_rejects_bad_dimensions() {
    assert!(Board::new(0, 8).is_err());
    assert!(Board::new(8, -1).is_err());
    assert!(Board::new(i32::MAX, 2).is_err());
}

#[test]
fn test_index_coordinates_round_trip() {
    let board = Board::new(5, 3).unwrap();
    for i in 0..15 {
        let (x, y) = board.coords_of(i).unwrap();
        assert_eq!(board.cell_index_of(x, y), Some(i));
        assert_eq!(i, y * 5 + x);
    }
    assert_eq!(board.coords_of(NO_CELL), None);
    assert_eq!(board.coords_of(15), None);
    assert_eq!(board.cell_index_of(5, 0), None);
    assert_eq!(board.cell_index_of(-1, 0), None);
}

#[test]
fn test_adjacency_is_symmetric() {
    let board = Board::new(8, 8).unwrap();
    for a in -1..=64 {
        for b in -1..=64 {
            assert_eq!(
                board.are_adjacent(a, b),
                board.are_adjacent(b, a),
                "adjacency of {} and {} is not symmetric",
                a,
                b
            );
        }
    }
}

#[test]
fn test_adjacency_does_not_wrap_rows() {
    let board = Board::new(8, 8).unwrap();
    // End of row 0 and start of row 1 are consecutive indices, not neighbors.
    assert!(!board.are_adjacent(7, 8));
    assert!(board.are_adjacent(0, 1));
    assert!(board.are_adjacent(0, 8));
    assert!(!board.are_adjacent(0, 9));
    assert!(!board.are_adjacent(0, 0));
    assert!(!board.are_adjacent(0, 10));
}

#[test]
fn test_neighbors_match_adjacency() {
    let board = Board::new(4, 4).unwrap();
    for a in 0..16 {
        let n = board.neighbors(a);
        for b in 0..16 {
            assert_eq!(n.contains(&b), board.are_adjacent(a, b));
        }
    }
    assert_eq!(board.neighbors(0).len(), 2);
    assert_eq!(board.neighbors(5).len(), 4);
    assert!(board.neighbors(NO_CELL).is_empty());
}

#[test]
fn test_swap_twice_is_identity() {
    let original = random_board(6, 5, 42);
    let indices: Vec<CellIndex> = (-2..=31).collect();
    for &a in &indices {
        for &b in &indices {
            let mut board = original.clone();
            board.swap(a, b);
            board.swap(a, b);
            assert_eq!(board, original, "swap({}, {}) twice changed the board", a, b);
        }
    }
}

#[test]
fn test_swap_with_invalid_index_is_noop() {
    let original = random_board(4, 4, 7);
    let mut board = original.clone();
    assert!(!board.swap(NO_CELL, 3));
    assert!(!board.swap(3, 16));
    assert_eq!(board, original);
}

#[test]
fn test_set_and_get_ignore_invalid_indices() {
    let mut board = Board::new(3, 3).unwrap();
    assert!(board.set(4, Piece::new(2)));
    assert_eq!(board.get(4), Some(Piece::new(2)));
    assert!(!board.set(NO_CELL, Piece::new(1)));
    assert!(!board.set(9, Piece::new(1)));
    assert_eq!(board.get(NO_CELL), None);
    assert!(board.set_empty(4));
    assert!(!board.is_active(4));
}

#[test]
fn test_fill_random_is_deterministic() {
    assert_eq!(random_board(8, 8, 3), random_board(8, 8, 3));
    assert_ne!(random_board(8, 8, 3), random_board(8, 8, 4));
    assert!(random_board(8, 8, 3).is_full());
}
