//! Rules-engine layer: a history-aware [`Position`] over the `chess` crate,
//! with move classification, draw detection and FEN/UCI notation.

mod error;
mod moves;
mod position;

pub use chess::{
    ALL_SQUARES, BitBoard, Board, BoardStatus, ChessMove, Color, EMPTY, File, MoveGen, Piece, Rank,
    Square,
};
pub use error::CoreError;
pub use moves::{Move, MoveKind, MoveList};
pub use position::{GameOver, Position, STARTING_FEN};
