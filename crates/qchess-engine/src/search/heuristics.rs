//! Quiet-move ordering heuristics: killer lists, history counters and
//! countermoves.

use std::collections::VecDeque;

use qchess_core::{Color, Move};

use crate::search::MAX_DEPTH;

/// Killer moves kept per ply.
pub const MAX_KILLERS: usize = 16;

/// History counters are halved once any of them reaches this value.
pub const MAX_HISTORY: u32 = 10_000;

/// Recency-ordered quiet moves that caused a cutoff, per ply from the root.
pub struct KillerTable {
    plies: Vec<VecDeque<Move>>,
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            plies: vec![VecDeque::with_capacity(MAX_KILLERS + 1); MAX_DEPTH as usize + 1],
        }
    }

    /// Record `mv` as the most recent killer at `ply`.
    ///
    /// A move already in the list moves to the front; the oldest entry is
    /// evicted once the list exceeds [`MAX_KILLERS`].
    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(list) = self.plies.get_mut(ply) else {
            return;
        };
        if let Some(pos) = list.iter().position(|&k| k == mv) {
            list.remove(pos);
        }
        list.push_front(mv);
        list.truncate(MAX_KILLERS);
    }

    /// Recency index of `mv` at `ply`: 0 for the newest killer.
    pub fn index_of(&self, ply: usize, mv: Move) -> Option<usize> {
        self.plies.get(ply)?.iter().position(|&k| k == mv)
    }

    /// Killers stored at `ply`, newest first.
    pub fn at(&self, ply: usize) -> impl Iterator<Item = &Move> {
        self.plies.get(ply).into_iter().flatten()
    }

    pub fn clear(&mut self) {
        self.plies.iter_mut().for_each(VecDeque::clear);
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Cutoff counters indexed by `[side][from][to]`.
pub struct HistoryTable {
    table: Box<[[[u32; 64]; 64]; 2]>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    /// Credit a quiet cutoff with `depth²`, halving the whole table while
    /// the updated counter is at or above [`MAX_HISTORY`].
    pub fn reward(&mut self, side: Color, mv: Move, depth: i32) {
        let (s, from, to) = index(side, mv);
        let bonus = depth.max(0).unsigned_abs().pow(2);
        self.table[s][from][to] = self.table[s][from][to].saturating_add(bonus);

        while self.table[s][from][to] >= MAX_HISTORY {
            self.shrink();
        }
    }

    pub fn score(&self, side: Color, mv: Move) -> u32 {
        let (s, from, to) = index(side, mv);
        self.table[s][from][to]
    }

    /// Largest counter in the table.
    pub fn max_value(&self) -> u32 {
        self.table.iter().flatten().flatten().copied().max().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        *self.table = [[[0; 64]; 64]; 2];
    }

    fn shrink(&mut self) {
        for value in self.table.iter_mut().flatten().flatten() {
            *value /= 2;
        }
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

fn index(side: Color, mv: Move) -> (usize, usize, usize) {
    (
        side.to_index(),
        mv.get_source().to_index(),
        mv.get_dest().to_index(),
    )
}

/// The latest refutation of each `(from, to)` move.
pub struct CountermoveTable {
    table: Box<[[Option<Move>; 64]; 64]>,
}

impl CountermoveTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[None; 64]; 64]),
        }
    }

    /// Record `reply` as the refutation of `previous`.
    pub fn store(&mut self, previous: Move, reply: Move) {
        self.table[previous.get_source().to_index()][previous.get_dest().to_index()] = Some(reply);
    }

    pub fn get(&self, previous: Move) -> Option<Move> {
        self.table[previous.get_source().to_index()][previous.get_dest().to_index()]
    }

    pub fn clear(&mut self) {
        *self.table = [[None; 64]; 64];
    }
}

impl Default for CountermoveTable {
    fn default() -> Self {
        Self::new()
    }
}

/// All ordering heuristics of one search, reset together.
#[derive(Default)]
pub struct Heuristics {
    pub killers: KillerTable,
    pub history: HistoryTable,
    pub countermoves: CountermoveTable,
}

impl Heuristics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.killers.clear();
        self.history.clear();
        self.countermoves.clear();
    }
}
