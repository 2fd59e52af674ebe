//! Transposition table: a bounded hash map from position hash to the result
//! of an earlier search.
//!
//! Replacement: an existing key is always overwritten; a new key is
//! inserted only while the table is below its entry capacity.

use std::collections::HashMap;

use qchess_core::Move;

use crate::search::{MATE, is_mate_score};

/// Hard ceiling on the number of entries, whatever the configured size.
pub const MAX_ENTRIES: usize = 200_000_000;

/// Default table size in megabytes.
pub const DEFAULT_HASH_MB: usize = 64;

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// The score is exact.
    Exact,
    /// The true score is at least this (the node failed high).
    Lower,
    /// The true score is at most this (no move raised alpha).
    Upper,
}

/// A cached search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub bound: Bound,
    /// Remaining depth the node was searched with.
    pub depth: i32,
    /// Score from the side to move's perspective.
    pub score: i32,
    pub best_move: Option<Move>,
}

/// Convert a root-relative mate score to node-relative before storing.
///
/// Mate scores count plies from the root; the table may be probed at a
/// different ply, so they are stored as distance from the node instead.
pub fn score_to_tt(score: i32, ply: i32) -> i32 {
    if !is_mate_score(score) {
        score
    } else if score > 0 {
        (score + ply).min(MATE)
    } else {
        (score - ply).max(-MATE)
    }
}

/// Reverse of [`score_to_tt`].
pub fn score_from_tt(score: i32, ply: i32) -> i32 {
    if !is_mate_score(score) {
        score
    } else if score > 0 {
        score - ply
    } else {
        score + ply
    }
}

/// Bounded map from position hash to [`TtEntry`].
pub struct TranspositionTable {
    entries: HashMap<u64, TtEntry>,
    capacity: usize,
}

impl TranspositionTable {
    /// A table holding as many entries as fit in `mb` megabytes.
    pub fn new(mb: usize) -> Self {
        Self::with_entries(entries_for_mb(mb))
    }

    /// A table holding at most `capacity` entries.
    pub fn with_entries(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.clamp(1, MAX_ENTRIES),
        }
    }

    /// Change the size; existing entries are dropped.
    pub fn resize(&mut self, mb: usize) {
        *self = Self::new(mb);
    }

    /// Look up `hash`, translating mate scores to be relative to `ply`.
    pub fn probe(&self, hash: u64, ply: i32) -> Option<TtEntry> {
        self.entries.get(&hash).map(|entry| TtEntry {
            score: score_from_tt(entry.score, ply),
            ..*entry
        })
    }

    /// The stored best move for `hash`, if any.
    pub fn best_move(&self, hash: u64) -> Option<Move> {
        self.entries.get(&hash).and_then(|entry| entry.best_move)
    }

    pub fn contains(&self, hash: u64) -> bool {
        self.entries.contains_key(&hash)
    }

    /// Record a result. Overwrites an existing key unconditionally; a new
    /// key is dropped once the table is full.
    pub fn store(
        &mut self,
        hash: u64,
        bound: Bound,
        depth: i32,
        score: i32,
        best_move: Option<Move>,
        ply: i32,
    ) {
        let entry = TtEntry {
            bound,
            depth,
            score: score_to_tt(score, ply),
            best_move,
        };
        if let Some(slot) = self.entries.get_mut(&hash) {
            *slot = entry;
        } else if self.entries.len() < self.capacity {
            self.entries.insert(hash, entry);
        }
    }

    /// Remove every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fill level in permille.
    pub fn hashfull(&self) -> usize {
        self.entries.len() * 1000 / self.capacity
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_MB)
    }
}

/// Approximate number of entries that fit in `mb` megabytes, counting the
/// key, the entry and one control byte per slot.
fn entries_for_mb(mb: usize) -> usize {
    let slot = std::mem::size_of::<(u64, TtEntry)>() + 1;
    (mb.max(1) * 1024 * 1024 / slot).min(MAX_ENTRIES)
}
