//! Errors raised while building positions from external notation.

/// Errors produced by [`Position`](crate::Position) construction and move input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The FEN string could not be parsed into a legal board.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
    },

    /// A halfmove clock or fullmove number field is not a number.
    #[error("invalid {field} in FEN: {found}")]
    InvalidMoveCounter {
        /// Which counter failed ("halfmove clock" or "fullmove number").
        field: &'static str,
        /// The offending token.
        found: String,
    },

    /// A UCI move string does not name a legal move in the position.
    #[error("illegal or malformed move: {uci_move}")]
    IllegalMove {
        /// The UCI move string as received.
        uci_move: String,
    },

    /// A pass was requested while the side to move is in check.
    #[error("cannot pass while in check")]
    NullMoveInCheck,
}
