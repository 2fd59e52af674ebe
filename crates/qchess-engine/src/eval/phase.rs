//! Game phase from remaining material.

use qchess_core::{Board, Piece};

/// Material weight of a full middlegame; anything at or above it is phase 0.
pub const PHASE_TOTAL: f32 = 256.0;

/// Phase weights indexed by piece: pawn 1, minor 10, rook 20, queen 40.
const PHASE_WEIGHT: [u32; 6] = [1, 10, 10, 20, 40, 0];

/// Game phase in `[0.0, 1.0]`: 0.0 with most material on the board, 1.0 in a
/// bare endgame.
///
/// The starting position weighs 16 + 40 + 40 + 80 + 80 = 256.
pub fn game_phase(board: &Board) -> f32 {
    let remaining: u32 = [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
        .into_iter()
        .map(|piece| board.pieces(piece).popcnt() * PHASE_WEIGHT[piece.to_index()])
        .sum();

    ((PHASE_TOTAL - remaining as f32) / PHASE_TOTAL).clamp(0.0, 1.0)
}
