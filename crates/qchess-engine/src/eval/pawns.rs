//! Pawn structure: doubled, tripled and isolated pawns, counted per file.

use qchess_core::{Board, Color, Piece};

use crate::eval::score::{Score, S};

/// Exactly two pawns of one side on a file.
pub const DOUBLED_PAWN: Score = S(-7, -20);

/// Three or more pawns of one side on a file.
pub const TRIPLED_PAWN: Score = S(-12, -37);

/// Pawns on a file with no friendly pawns on either neighbouring file.
pub const ISOLATED_PAWN: Score = S(-7, -20);

/// Number of `color` pawns on each file, a through h.
pub fn file_counts(board: &Board, color: Color) -> [u8; 8] {
    let pawns = *board.pieces(Piece::Pawn) & *board.color_combined(color);
    let mut counts = [0u8; 8];
    for sq in pawns {
        counts[sq.get_file().to_index()] += 1;
    }
    counts
}

/// Structure penalties for one side's file counts. Non-positive.
fn side_structure(counts: &[u8; 8]) -> Score {
    let mut score = Score::ZERO;
    for (file, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        match count {
            1 => {}
            2 => score += DOUBLED_PAWN,
            _ => score += TRIPLED_PAWN,
        }

        let left = file > 0 && counts[file - 1] > 0;
        let right = file < 7 && counts[file + 1] > 0;
        if !left && !right {
            score += ISOLATED_PAWN;
        }
    }
    score
}

/// Pawn structure, White minus Black.
pub fn evaluate_pawns(board: &Board) -> Score {
    side_structure(&file_counts(board, Color::White))
        - side_structure(&file_counts(board, Color::Black))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use qchess_core::Board;

    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_str(fen).unwrap()
    }

    #[test]
    fn starting_position_has_no_penalties() {
        assert_eq!(evaluate_pawns(&Board::default()), Score::ZERO);
    }

    #[test]
    fn single_isolated_pawn() {
        let b = board("4k3/8/8/8/8/8/P7/4K3 w - - 0 1");
        assert_eq!(file_counts(&b, Color::White), [1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(evaluate_pawns(&b), ISOLATED_PAWN);
    }

    #[test]
    fn doubled_and_tripled() {
        // White: doubled on c, supported by b. Black: tripled and isolated on h.
        let b = board("4k3/7p/7p/7p/8/2P5/1PP5/4K3 w - - 0 1");
        assert_eq!(evaluate_pawns(&b), DOUBLED_PAWN - TRIPLED_PAWN - ISOLATED_PAWN);
    }

    #[test]
    fn penalties_lower_the_score() {
        let b = board("4k3/8/8/8/8/P7/P7/4K3 w - - 0 1");
        let s = evaluate_pawns(&b);
        assert!(s.mg() < 0 && s.eg() < 0);
    }
}
