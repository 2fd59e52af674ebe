//! UCI protocol errors.

/// Errors that can occur during UCI protocol handling.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command is missing `startpos` or `fen` keyword.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// Failed to parse a FEN string.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
    },

    /// A move in the `position` command is malformed or illegal.
    #[error("invalid move: {uci_move}")]
    InvalidMove {
        /// The UCI move string that failed to parse.
        uci_move: String,
    },

    /// A `go` parameter was given without its value.
    #[error("missing value for go parameter {param}")]
    MissingGoValue {
        /// The parameter name.
        param: String,
    },

    /// A `go` parameter value is not a valid number.
    #[error("invalid value for go parameter {param}: {value}")]
    InvalidGoValue {
        /// The parameter name.
        param: String,
        /// The value as received.
        value: String,
    },

    /// `setoption` names an option the engine does not have.
    #[error("unknown option: {name}")]
    UnknownOption {
        /// The option name as received.
        name: String,
    },

    /// `setoption` without `value`, or with a value the option rejects.
    #[error("invalid value for option {name}: {value}")]
    InvalidOptionValue {
        /// The option name.
        name: String,
        /// The value as received, empty when missing.
        value: String,
    },

    /// An I/O error occurred on the protocol streams.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
