//! Move classification on top of the `chess` crate's move type.

use chess::{Board, ChessMove, Piece};

/// A move as produced by the rules engine.
///
/// Castling is encoded as the king's two-square step and promotions carry
/// their piece, so `Display` yields standard UCI notation (`e2e4`, `e7e8q`).
pub type Move = ChessMove;

/// Legal moves in generation order.
pub type MoveList = Vec<Move>;

/// The category of a legal move.
///
/// A capturing promotion is a [`MoveKind::Promotion`]; en passant is a
/// [`MoveKind::Capture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// A non-capturing, non-promoting move.
    Normal,
    /// Any capture, including en passant.
    Capture,
    /// A pawn promotion, capturing or not.
    Promotion,
    /// King two-square step with its rook.
    Castle,
}

/// Classify `mv` in the context of `board` (before the move is played).
pub(crate) fn classify(board: &Board, mv: Move) -> MoveKind {
    if mv.get_promotion().is_some() {
        return MoveKind::Promotion;
    }
    if captured_piece(board, mv).is_some() {
        return MoveKind::Capture;
    }
    let from = mv.get_source();
    let to = mv.get_dest();
    if board.piece_on(from) == Some(Piece::King)
        && from.get_file().to_index().abs_diff(to.get_file().to_index()) == 2
    {
        return MoveKind::Castle;
    }
    MoveKind::Normal
}

/// The piece removed by `mv`, if any. En passant removes a pawn.
pub(crate) fn captured_piece(board: &Board, mv: Move) -> Option<Piece> {
    let from = mv.get_source();
    let to = mv.get_dest();
    if let Some(victim) = board.piece_on(to) {
        return Some(victim);
    }
    let pawn_changes_file = board.piece_on(from) == Some(Piece::Pawn)
        && from.get_file() != to.get_file();
    pawn_changes_file.then_some(Piece::Pawn)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chess::{Board, Piece};

    use super::*;
    use crate::Position;

    fn find(board: &Board, uci: &str) -> Move {
        chess::MoveGen::new_legal(board)
            .find(|m| m.to_string() == uci)
            .unwrap()
    }

    #[test]
    fn quiet_pawn_push_is_normal() {
        let board = Board::default();
        assert_eq!(classify(&board, find(&board, "e2e4")), MoveKind::Normal);
    }

    #[test]
    fn en_passant_captures_a_pawn() {
        let board =
            Board::from_str("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3").unwrap();
        let ep = find(&board, "e5d6");
        assert_eq!(classify(&board, ep), MoveKind::Capture);
        assert_eq!(captured_piece(&board, ep), Some(Piece::Pawn));
    }

    #[test]
    fn castling_is_detected() {
        let board = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(classify(&board, find(&board, "e1g1")), MoveKind::Castle);
        assert_eq!(classify(&board, find(&board, "e1c1")), MoveKind::Castle);
        assert_eq!(classify(&board, find(&board, "e1f1")), MoveKind::Normal);
    }

    #[test]
    fn capturing_promotion_is_a_promotion() {
        let pos = Position::from_fen("1r5k/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = pos.parse_uci_move("a7b8q").unwrap();
        assert_eq!(pos.move_kind(mv), MoveKind::Promotion);
        assert!(pos.is_capture(mv));
    }
}
