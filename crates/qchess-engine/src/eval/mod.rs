//! Hand-crafted static evaluation.

pub mod material;
pub mod mobility;
pub mod pawns;
pub mod phase;
pub mod pst;
pub mod score;

use qchess_core::{BoardStatus, Color, Position};

use self::material::material;
use self::mobility::evaluate_mobility;
use self::pawns::evaluate_pawns;
use self::phase::game_phase;
use self::pst::placement;
use self::score::{Score, S};

/// Bonus for having the move.
pub const TEMPO_BONUS: Score = S(20, 0);

/// Whether the position is scored as an immediate draw: a single repetition,
/// the fifty-move rule, insufficient material, or stalemate.
pub fn is_drawn(pos: &Position) -> bool {
    pos.is_repetition(1)
        || pos.is_fifty_move_draw()
        || pos.is_insufficient_material()
        || pos.board().status() == BoardStatus::Stalemate
}

/// Evaluate `pos` in centipawns from the side to move's perspective.
///
/// Drawn positions (see [`is_drawn`]) score exactly 0. Otherwise placement,
/// material, mobility and pawn structure are summed for White minus Black,
/// tapered by game phase, flipped to the mover and given the tempo bonus.
pub fn evaluate(pos: &Position) -> i32 {
    if is_drawn(pos) {
        return 0;
    }

    let board = pos.board();
    let phase = game_phase(board);

    let white_view =
        placement(board) + material(board) + evaluate_mobility(board) + evaluate_pawns(board);

    let relative = match board.side_to_move() {
        Color::White => white_view,
        Color::Black => -white_view,
    };

    relative.taper(phase) + TEMPO_BONUS.taper(phase)
}
