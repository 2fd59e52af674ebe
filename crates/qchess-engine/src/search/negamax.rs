//! Negamax alpha-beta search with quiescence.
//!
//! Cutoffs return the bound itself rather than the score that caused them.
//! `None` from [`Tree::negamax`] means the search was stopped and the value
//! must be discarded.

use qchess_core::{GameOver, Move};

use crate::eval::evaluate;
use crate::eval::phase::game_phase;
use crate::search::ordering::{
    MovePicker, OrderingContext, is_noisy, is_quiet, lmr_reduction, two_plies_back,
};
use crate::search::tree::Tree;
use crate::search::tt::Bound;
use crate::search::{ASPIRATION_DEPTH, ASPIRATION_GROWTH, ASPIRATION_WINDOW, MATE, is_mate_score};

/// Quiescence gives up on a node whose stand-pat is this far below alpha.
pub const DELTA_MARGIN: i32 = 1000;

/// Futility margins by remaining depth.
const FUTILITY_MARGINS: [i32; 6] = [0, 100, 200, 300, 400, 500];

/// Reverse futility margins by remaining depth.
const REVERSE_FUTILITY_MARGINS: [i32; 8] = [0, 70, 150, 240, 340, 450, 580, 720];

const NULL_MOVE_MIN_DEPTH: i32 = 3;
const LMR_MIN_DEPTH: i32 = 3;
const LMR_MIN_MOVE: usize = 4;
/// Extra moves searched at full depth in PV nodes before reducing.
const LMR_PV_EXTRA: usize = 2;

impl Tree<'_> {
    /// Search the current node to `depth` plies with window `(alpha, beta)`.
    ///
    /// `ply` is the distance from the root. A null move is only tried when
    /// `allow_null` is set, so two passes never follow each other.
    pub fn negamax(
        &mut self,
        depth: i32,
        ply: i32,
        mut alpha: i32,
        mut beta: i32,
        allow_null: bool,
    ) -> Option<i32> {
        if self.control.should_stop(self.nodes) {
            return None;
        }
        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply);

        let pv_node = beta - alpha > 1;

        // Mate distance pruning.
        if ply != 0 {
            alpha = alpha.max(-MATE + ply);
            beta = beta.min(MATE - ply - 1);
            if alpha >= beta {
                return Some(alpha);
            }
        }
        let alpha_orig = alpha;

        let hash = self.pos.hash();
        let mut tt_move = None;
        let mut estimate = None;
        if let Some(entry) = self.tt.probe(hash, ply) {
            if entry.depth >= depth && !pv_node {
                match entry.bound {
                    Bound::Exact => return Some(entry.score),
                    Bound::Lower if entry.score >= beta => return Some(beta),
                    Bound::Upper if entry.score <= alpha => return Some(alpha),
                    _ => {}
                }
            }
            tt_move = entry.best_move;
            estimate = Some(entry.score);
        }

        if depth <= 0 {
            return Some(self.quiescence(depth, ply, alpha, beta));
        }

        let game_over = self.pos.game_over();
        let in_check = self.pos.in_check();

        let mut futile = false;
        if !pv_node && game_over.is_none() && !in_check {
            let estimate = estimate.unwrap_or_else(|| evaluate(&self.pos));

            if allow_null && ply != 0 && depth >= NULL_MOVE_MIN_DEPTH {
                let reduction = (3.0
                    + f64::from(depth) / 3.0
                    + (f64::from(estimate - beta) / 200.0).min(3.0)) as i32;
                if reduction > 0
                    && let Some(mut child) = self.pass()
                {
                    let score =
                        -child.negamax(depth - reduction, ply + 1, -beta, -beta + 1, false)?;
                    if score >= beta && !is_mate_score(score) {
                        return Some(beta);
                    }
                }
            }

            if let Some(&margin) = FUTILITY_MARGINS.get(depth as usize)
                && estimate + margin < alpha
            {
                futile = true;
            }

            if let Some(&margin) = REVERSE_FUTILITY_MARGINS.get(depth as usize)
                && estimate - margin > beta
            {
                return Some(estimate);
            }
        }

        // Repetition and fifty-move draws are only claimed below the root, so
        // the root always searches its moves.
        let drawn_by_rule =
            ply != 0 && (self.pos.is_repetition(1) || self.pos.is_fifty_move_draw());
        if game_over.is_some() || drawn_by_rule {
            let score = if game_over == Some(GameOver::Checkmate) {
                -MATE + ply
            } else {
                0
            };
            self.tt.store(hash, Bound::Exact, depth, score, None, ply);
            return Some(score);
        }

        let picker = {
            let ctx = OrderingContext {
                tt_move,
                heuristics: &*self.heuristics,
                path: &self.path,
                ply: ply as usize,
                phase: game_phase(self.pos.board()),
            };
            MovePicker::new(&self.pos, self.pos.legal_moves(), &ctx)
        };

        let side = self.pos.side_to_move();
        let mut best_move: Option<Move> = None;
        let mut best_score = -MATE - 1;
        let lmr_from = LMR_MIN_MOVE + if pv_node { LMR_PV_EXTRA } else { 0 };

        for (index, mv) in picker.enumerate() {
            let move_number = index + 1;
            let quiet = is_quiet(&self.pos, mv);

            if futile && quiet && !in_check && !is_mate_score(alpha) && !is_mate_score(beta) {
                continue;
            }

            let reduction = if quiet && !in_check && depth >= LMR_MIN_DEPTH && move_number >= lmr_from {
                lmr_reduction(depth, move_number)
            } else {
                0
            };

            let (mut score, terminal) = {
                let mut child = self.play(mv);
                let outcome = child.pos.game_over();
                if outcome.is_some() {
                    child.seldepth = child.seldepth.max(ply + 1);
                }
                match outcome {
                    Some(outcome) if outcome.is_checkmate() => (MATE - ply, true),
                    Some(_) => (0, true),
                    None => (
                        -child.negamax(depth - 1 - reduction, ply + 1, -alpha - 1, -alpha, true)?,
                        false,
                    ),
                }
            };

            if !terminal && score > alpha && score < beta {
                let mut child = self.play(mv);
                score = -child.negamax(depth - 1, ply + 1, -beta, -alpha, true)?;
            }

            if score >= beta {
                if quiet && !in_check {
                    self.heuristics.killers.store(ply as usize, mv);
                    self.heuristics.history.reward(side, mv, depth);
                    if let Some(previous) = two_plies_back(&self.path) {
                        self.heuristics.countermoves.store(previous, mv);
                    }
                }
                self.tt.store(hash, Bound::Lower, depth, beta, Some(mv), ply);
                return Some(beta);
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                alpha = alpha.max(score);
            }
        }

        let bound = if alpha > alpha_orig {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt.store(hash, bound, depth, alpha, best_move, ply);
        Some(alpha)
    }

    /// Resolve captures, promotions and early checks until the position is
    /// quiet. `depth` is zero or negative; checks are only tried in the
    /// first few plies below the horizon.
    pub fn quiescence(&mut self, depth: i32, ply: i32, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply);

        let stand_pat = evaluate(&self.pos);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat < alpha - DELTA_MARGIN {
            return alpha;
        }
        alpha = alpha.max(stand_pat);

        let picker = {
            let noisy: Vec<Move> = self
                .pos
                .legal_moves()
                .into_iter()
                .filter(|&mv| is_noisy(&self.pos, mv, -depth))
                .collect();
            let ctx = OrderingContext {
                tt_move: None,
                heuristics: &*self.heuristics,
                path: &self.path,
                ply: ply as usize,
                phase: game_phase(self.pos.board()),
            };
            MovePicker::new(&self.pos, noisy, &ctx)
        };

        for mv in picker {
            let score = {
                let mut child = self.play(mv);
                -child.quiescence(depth - 1, ply + 1, -beta, -alpha)
            };
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }

        alpha
    }

    /// Search the root to `depth`, starting from a narrow window around
    /// `guess` and widening the failing side until the score lands inside.
    ///
    /// Shallow depths use the full window.
    pub fn aspiration(&mut self, depth: i32, guess: i32) -> Option<i32> {
        if depth < ASPIRATION_DEPTH {
            return self.negamax(depth, 0, -MATE, MATE, true);
        }

        let mut center = guess;
        let mut below = ASPIRATION_WINDOW;
        let mut above = ASPIRATION_WINDOW;
        loop {
            let alpha = center.saturating_sub(below);
            let beta = center.saturating_add(above);
            let score = self.negamax(depth, 0, alpha, beta, true)?;
            center = score;
            if score <= alpha {
                below = below.saturating_mul(ASPIRATION_GROWTH);
            } else if score >= beta {
                above = above.saturating_mul(ASPIRATION_GROWTH);
            } else {
                return Some(score);
            }
            tracing::trace!(depth, alpha, beta, score, "aspiration window missed");
        }
    }
}
