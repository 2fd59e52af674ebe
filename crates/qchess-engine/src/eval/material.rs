//! Material balance and the bishop-pair bonus.

use qchess_core::{Board, Color, Piece};

use crate::eval::score::{Score, S};

/// Tapered piece values, indexed by [`Piece::to_index`].
///
/// | Piece  | mg  | eg   |
/// |--------|-----|------|
/// | Pawn   |  85 |   80 |
/// | Knight | 325 |  289 |
/// | Bishop | 330 |  318 |
/// | Rook   | 444 |  560 |
/// | Queen  | 998 | 1016 |
/// | King   |   0 |    0 |
pub const MATERIAL_VALUE: [Score; 6] = [
    S(85, 80),
    S(325, 289),
    S(330, 318),
    S(444, 560),
    S(998, 1016),
    S(0, 0),
];

/// Flat centipawn values used to rank captures.
pub const EXCHANGE_VALUE: [i32; 6] = [100, 300, 300, 500, 900, 0];

/// Bonus for a side holding exactly two bishops.
pub const BISHOP_PAIR_BONUS: Score = S(34, 55);

const ALL_PIECES: [Piece; 6] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
    Piece::King,
];

/// Flat exchange value of `piece`.
#[inline]
pub fn exchange_value(piece: Piece) -> i32 {
    EXCHANGE_VALUE[piece.to_index()]
}

/// Material balance plus bishop pairs, White minus Black.
pub fn material(board: &Board) -> Score {
    let white = *board.color_combined(Color::White);
    let black = *board.color_combined(Color::Black);

    let mut score = Score::ZERO;
    for piece in ALL_PIECES {
        let pieces = *board.pieces(piece);
        let diff = (pieces & white).popcnt() as i16 - (pieces & black).popcnt() as i16;
        score += MATERIAL_VALUE[piece.to_index()] * diff;
    }

    let bishops = *board.pieces(Piece::Bishop);
    if (bishops & white).popcnt() == 2 {
        score += BISHOP_PAIR_BONUS;
    }
    if (bishops & black).popcnt() == 2 {
        score -= BISHOP_PAIR_BONUS;
    }

    score
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use qchess_core::{Board, Piece};

    use super::*;

    #[test]
    fn starting_position_is_balanced() {
        assert_eq!(material(&Board::default()), Score::ZERO);
    }

    #[test]
    fn extra_queen_for_white() {
        let board = Board::from_str("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert_eq!(material(&board), MATERIAL_VALUE[Piece::Queen.to_index()]);
    }

    #[test]
    fn bishop_pair_needs_exactly_two() {
        let pair = Board::from_str("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1").unwrap();
        let bishop = MATERIAL_VALUE[Piece::Bishop.to_index()];
        assert_eq!(material(&pair), bishop * 2 + BISHOP_PAIR_BONUS);

        let three = Board::from_str("4k3/8/8/8/8/8/8/1BB1KB2 w - - 0 1").unwrap();
        assert_eq!(material(&three), bishop * 3);
    }

    #[test]
    fn exchange_values() {
        assert_eq!(exchange_value(Piece::Queen), 900);
        assert_eq!(exchange_value(Piece::King), 0);
    }
}
