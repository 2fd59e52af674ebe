//! UCI protocol handling for qchess.

pub mod command;
pub mod engine;
pub mod error;

pub use command::{Command, GoParams, UciOption, parse_command};
pub use engine::{EngineConfig, Output, UciEngine};
pub use error::UciError;
