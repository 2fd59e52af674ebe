//! Per-piece-type mobility.
//!
//! Every legal move is credited to the type of the piece making it. The
//! per-type total indexes a 28-entry table; larger totals use the last
//! entry.

use qchess_core::{Board, Color, MoveGen};

use crate::eval::score::{Score, S};

/// Highest mobility index; totals above it are clamped.
pub const MAX_MOBILITY: usize = 27;

/// `[piece][mg/eg][legal move count]`.
#[rustfmt::skip]
const MOBILITY: [[[i8; MAX_MOBILITY + 1]; 2]; 6] = [
    // Pawn
    [
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, -5, -5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    ],
    // Knight
    [
        [-21, -6, 2, 5, 9, 11, 11, 11, 10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [-21, -6, 2, 5, 9, 11, 11, 11, 10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    ],
    // Bishop
    [
        [-45, -34, -22, -16, -7, 3, 9, 13, 16, 14, 14, 16, 16, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [-45, -34, -22, -16, -7, 3, 9, 13, 16, 14, 14, 16, 16, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    ],
    // Rook
    [
        [-29, -16, -12, -6, -4, 1, 4, 6, 9, 13, 13, 14, 16, 17, 17, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [-29, -16, -12, -6, -4, 1, 4, 6, 9, 13, 13, 14, 16, 17, 17, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    ],
    // Queen
    [
        [-55, -80, -39, -37, -44, -33, -14, -29, -13, -17, 2, -4, 2, 15, 20, 27, 22, 42, 47, 48, 51, 51, 54, 47, 50, 56, 46, 75],
        [-20, -11, -31, -21, -19, -14, -10, -9, -5, -2, -2, 0, 3, -1, 3, 4, 3, 2, 6, 16, 25, 25, 19, 33, 28, 37, 20, 78],
    ],
    // King
    [
        [-20, -5, 0, 0, 0, -5, -10, -20, -20, -20, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [-50, -40, -30, -20, -10, 0, 10, 20, 20, 20, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    ],
];

/// Mobility bonus for `piece_index` pieces with `count` legal moves between them.
#[inline]
pub fn mobility_bonus(piece_index: usize, count: usize) -> Score {
    let idx = count.min(MAX_MOBILITY);
    let table = &MOBILITY[piece_index];
    S(i16::from(table[0][idx]), i16::from(table[1][idx]))
}

/// Legal move counts per piece type for the side to move on `board`.
pub fn move_counts(board: &Board) -> [usize; 6] {
    let mut counts = [0usize; 6];
    for mv in MoveGen::new_legal(board) {
        if let Some(piece) = board.piece_on(mv.get_source()) {
            counts[piece.to_index()] += 1;
        }
    }
    counts
}

fn side_mobility(board: &Board) -> Score {
    move_counts(board)
        .iter()
        .enumerate()
        .fold(Score::ZERO, |acc, (piece, &count)| acc + mobility_bonus(piece, count))
}

/// Mobility of both sides, White minus Black.
///
/// The opponent is measured by passing the turn. When the side to move is
/// in check a pass is illegal and only the side to move is counted.
pub fn evaluate_mobility(board: &Board) -> Score {
    let mut score = side_mobility(board);
    if let Some(passed) = board.null_move() {
        score -= side_mobility(&passed);
    }
    match board.side_to_move() {
        Color::White => score,
        Color::Black => -score,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use qchess_core::Board;

    use super::*;

    #[test]
    fn startpos_move_counts() {
        let counts = move_counts(&Board::default());
        assert_eq!(counts, [16, 4, 0, 0, 0, 0]);
    }

    #[test]
    fn starting_position_is_balanced() {
        assert_eq!(evaluate_mobility(&Board::default()), Score::ZERO);
    }

    #[test]
    fn large_counts_clamp_to_last_entry() {
        assert_eq!(mobility_bonus(4, 40), mobility_bonus(4, MAX_MOBILITY));
        assert_eq!(mobility_bonus(4, MAX_MOBILITY), S(75, 78));
    }

    #[test]
    fn in_check_counts_only_side_to_move() {
        // White king in check from the rook: only White's evasions count.
        let board = Board::from_str("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").unwrap();
        let counts = move_counts(&board);
        assert_eq!(&counts[..5], &[0, 0, 0, 0, 0]);
        let expected = (0..5).fold(mobility_bonus(5, counts[5]), |acc, p| acc + mobility_bonus(p, 0));
        assert_eq!(evaluate_mobility(&board), expected);
    }
}
