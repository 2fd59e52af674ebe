//! Search and evaluation for qchess.

pub mod eval;
pub mod search;
pub mod time;

pub use eval::evaluate;
pub use search::control::{SearchControl, SearchLimits};
pub use search::tt::DEFAULT_HASH_MB;
pub use search::{InfoScore, MATE, MAX_DEPTH, SearchInfo, SearchResult, Searcher};
pub use time::limits_from_go;
