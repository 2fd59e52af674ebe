//! Search algorithms and move ordering.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tree;
pub mod tt;

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use qchess_core::{Move, Position};

use crate::eval::evaluate;
use crate::eval::phase::game_phase;
use control::SearchControl;
use heuristics::Heuristics;
use ordering::{MovePicker, OrderingContext};
use tree::Tree;
use tt::TranspositionTable;

/// Score of delivering checkmate at the root. A mate `n` plies away scores
/// `MATE - n`.
pub const MATE: i32 = 100_000;

/// Deepest iteration; also bounds the ply of mate scores.
pub const MAX_DEPTH: i32 = 100;

/// First depth searched with an aspiration window.
pub const ASPIRATION_DEPTH: i32 = 5;

/// Initial half-width of the aspiration window in centipawns.
pub const ASPIRATION_WINDOW: i32 = 100;

/// Factor applied to the failing side of the window on each re-search.
pub const ASPIRATION_GROWTH: i32 = 4;

/// Whether `score` encodes a forced mate for either side.
#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() + MAX_DEPTH >= MATE
}

/// Score as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoScore {
    Centipawns(i32),
    /// Moves (not plies) to mate; negative when the side to move is mated.
    Mate(i32),
}

impl InfoScore {
    /// Classify a search score, counting mate distance from the PV length.
    pub fn new(score: i32, pv_len: usize) -> Self {
        if is_mate_score(score) {
            let moves = pv_len.div_ceil(2) as i32;
            Self::Mate(if score < 0 { -moves } else { moves })
        } else {
            Self::Centipawns(score)
        }
    }
}

impl fmt::Display for InfoScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Centipawns(cp) => write!(f, "cp {cp}"),
            Self::Mate(moves) => write!(f, "mate {moves}"),
        }
    }
}

/// Progress report emitted after every completed iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: i32,
    pub seldepth: i32,
    pub nodes: u64,
    pub nps: u64,
    pub time: Duration,
    /// Transposition table fill in permille.
    pub hashfull: usize,
    pub score: InfoScore,
    pub pv: Vec<Move>,
}

/// Formats as a UCI `info` line.
impl fmt::Display for SearchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "info nodes {} nps {} time {} hashfull {} depth {} seldepth {} score {} pv",
            self.nodes,
            self.nps,
            self.time.as_millis(),
            self.hashfull,
            self.depth,
            self.seldepth,
            self.score,
        )?;
        for mv in &self.pv {
            write!(f, " {mv}")?;
        }
        Ok(())
    }
}

/// Result of a completed search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Move to play; `None` only when the root has no legal moves.
    pub best_move: Option<Move>,
    /// Score of the last completed iteration, side to move's perspective.
    pub score: Option<i32>,
    /// Last completed depth, 0 if none completed.
    pub depth: i32,
    /// Total nodes visited.
    pub nodes: u64,
    /// Principal variation of the last completed iteration.
    pub pv: Vec<Move>,
}

/// Iterative-deepening searcher owning the transposition table and the
/// ordering heuristics.
pub struct Searcher {
    tt: TranspositionTable,
    heuristics: Heuristics,
}

impl Searcher {
    /// Create a searcher with a `hash_mb` megabyte transposition table.
    pub fn new(hash_mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new(hash_mb),
            heuristics: Heuristics::new(),
        }
    }

    /// Resize the transposition table to the given size in megabytes.
    pub fn resize_tt(&mut self, mb: usize) {
        self.tt.resize(mb);
    }

    /// Forget everything learned by earlier searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.heuristics.clear();
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Run iterative deepening from `pos` up to `max_depth` (the engine
    /// maximum when `None`) until `control` says stop.
    ///
    /// Both tables are reset first. `on_info` is called after every
    /// completed iteration; an interrupted iteration is discarded.
    pub fn search<F>(
        &mut self,
        pos: &Position,
        max_depth: Option<i32>,
        control: &SearchControl,
        mut on_info: F,
    ) -> SearchResult
    where
        F: FnMut(&SearchInfo),
    {
        self.clear();

        let max_depth = max_depth.map_or(MAX_DEPTH - 1, |d| d.clamp(1, MAX_DEPTH - 1));
        let mut result = SearchResult::default();
        let mut guess = evaluate(pos);

        let mut tree = Tree::new(pos.clone(), &mut self.tt, &mut self.heuristics, control);

        for depth in 1..=max_depth {
            if control.should_stop_iterating() {
                break;
            }

            tree.seldepth = 0;
            let Some(score) = tree.aspiration(depth, guess) else {
                tracing::debug!(depth, nodes = tree.nodes, "iteration interrupted");
                break;
            };
            guess = score;

            let pv = extract_pv(&*tree.tt, pos);
            let elapsed = control.elapsed();
            let info = SearchInfo {
                depth,
                // Cutoffs near the root can leave the deepest node above the
                // nominal depth.
                seldepth: tree.seldepth.max(depth),
                nodes: tree.nodes,
                nps: nodes_per_second(tree.nodes, elapsed),
                time: elapsed,
                hashfull: tree.tt.hashfull(),
                score: InfoScore::new(score, pv.len()),
                pv,
            };
            tracing::debug!(
                depth,
                seldepth = info.seldepth,
                nodes = info.nodes,
                score,
                "iteration complete"
            );
            on_info(&info);

            if let Some(&first) = info.pv.first() {
                result.best_move = Some(first);
            }
            result.score = Some(score);
            result.depth = depth;
            result.pv = info.pv;
        }
        result.nodes = tree.nodes;

        if result.best_move.is_none() {
            result.best_move = fallback_move(pos, &self.heuristics);
        }

        tracing::info!(
            depth = result.depth,
            nodes = result.nodes,
            best_move = ?result.best_move.map(|mv| mv.to_string()),
            "search finished"
        );
        result
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(tt::DEFAULT_HASH_MB)
    }
}

impl fmt::Debug for Searcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("tt_len", &self.tt.len())
            .field("tt_capacity", &self.tt.capacity())
            .finish()
    }
}

/// Follow best moves through the table from `root`.
///
/// Stops at a missing entry or move, an illegal move, or a position already
/// on the line.
pub fn extract_pv(tt: &TranspositionTable, root: &Position) -> Vec<Move> {
    let mut pos = root.clone();
    let mut seen = HashSet::new();
    let mut pv = Vec::new();

    while seen.insert(pos.hash()) {
        let Some(mv) = tt.best_move(pos.hash()) else {
            break;
        };
        if !pos.is_legal(mv) {
            break;
        }
        pos.play(mv);
        pv.push(mv);
    }
    pv
}

/// Best root move by ordering alone, for when no iteration finished.
fn fallback_move(pos: &Position, heuristics: &Heuristics) -> Option<Move> {
    let ctx = OrderingContext {
        tt_move: None,
        heuristics,
        path: &[],
        ply: 0,
        phase: game_phase(pos.board()),
    };
    MovePicker::new(pos, pos.legal_moves(), &ctx).next()
}

fn nodes_per_second(nodes: u64, elapsed: Duration) -> u64 {
    let ms = (elapsed.as_millis() as u64).max(1);
    nodes.saturating_mul(1000) / ms
}
