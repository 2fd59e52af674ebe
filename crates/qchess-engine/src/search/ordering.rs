//! Move ordering and the late-move-reduction table.

use qchess_core::{Move, MoveKind, Piece, Position};

use crate::eval::material::exchange_value;
use crate::eval::pst::pst;
use crate::search::heuristics::Heuristics;

// ── Ordering scores ───────────────────────────────────────────────────────────

const TT_MOVE_SCORE: i32 = 30_000;
const PROMOTION_SCORE: i32 = 29_000;
const CAPTURE_BASE: i32 = 28_000;
const KILLER_BASE: i32 = 27_000;
const COUNTERMOVE_SCORE: i32 = 26_000;
const RECAPTURE_SCORE: i32 = 25_000;
const CHECK_SCORE: i32 = 24_000;
const KING_MOVE_PENALTY: i32 = 100;

/// Checking moves count as noisy in quiescence while the check-extension
/// counter is at most this.
pub const QUIESCENCE_CHECK_LIMIT: i32 = 3;

/// Whether `mv` is searched in quiescence: a capture, a promotion, or a
/// check while `check_depth` is within [`QUIESCENCE_CHECK_LIMIT`].
pub fn is_noisy(pos: &Position, mv: Move, check_depth: i32) -> bool {
    matches!(pos.move_kind(mv), MoveKind::Capture | MoveKind::Promotion)
        || (check_depth <= QUIESCENCE_CHECK_LIMIT && pos.gives_check(mv))
}

/// A quiet move in the main search: no capture, no promotion, no check.
#[inline]
pub fn is_quiet(pos: &Position, mv: Move) -> bool {
    !is_noisy(pos, mv, 0)
}

/// What the orderer knows about the node being searched.
pub struct OrderingContext<'a> {
    pub tt_move: Option<Move>,
    pub heuristics: &'a Heuristics,
    /// Moves from the root to this node; `None` marks a pass.
    pub path: &'a [Option<Move>],
    /// Distance from the root.
    pub ply: usize,
    /// Game phase of the node, see [`game_phase`](crate::eval::phase::game_phase).
    pub phase: f32,
}

/// The real move two plies back along `path`, if there is one.
pub fn two_plies_back(path: &[Option<Move>]) -> Option<Move> {
    let len = path.len();
    if len < 2 { None } else { path[len - 2] }
}

impl OrderingContext<'_> {
    fn last_move(&self) -> Option<Move> {
        self.path.last().copied().flatten()
    }
}

/// Ordering priority of `mv`; higher is searched first.
///
/// | band                                   | score                   |
/// |----------------------------------------|-------------------------|
/// | TT move                                | 30 000                  |
/// | promotion                              | 29 000                  |
/// | capture                                | 28 000 + victim − attacker |
/// | killer                                 | 27 000 − recency        |
/// | countermove of the move two plies back | 26 000                  |
/// | quiet reply on the last destination    | 25 000                  |
/// | quiet check                            | 24 000                  |
/// | other quiet                            | history + table delta   |
pub fn score_move(pos: &Position, mv: Move, ctx: &OrderingContext) -> i32 {
    if ctx.tt_move == Some(mv) {
        return TT_MOVE_SCORE;
    }
    if mv.get_promotion().is_some() {
        return PROMOTION_SCORE;
    }

    let attacker = pos.moved_piece(mv).unwrap_or(Piece::Pawn);
    if let Some(victim) = pos.captured_piece(mv) {
        return CAPTURE_BASE + exchange_value(victim) - exchange_value(attacker);
    }

    if let Some(idx) = ctx.heuristics.killers.index_of(ctx.ply, mv) {
        return KILLER_BASE - idx as i32;
    }

    if let Some(previous) = two_plies_back(ctx.path)
        && ctx.heuristics.countermoves.get(previous) == Some(mv)
    {
        return COUNTERMOVE_SCORE;
    }

    if let Some(last) = ctx.last_move()
        && last.get_dest() == mv.get_dest()
    {
        return RECAPTURE_SCORE;
    }

    if pos.gives_check(mv) {
        return CHECK_SCORE;
    }

    let side = pos.side_to_move();
    let mut score = ctx.heuristics.history.score(side, mv) as i32;
    if attacker == Piece::King {
        score -= KING_MOVE_PENALTY;
    }
    score += pst(attacker, side, mv.get_dest()).taper(ctx.phase);
    score -= pst(attacker, side, mv.get_source()).taper(ctx.phase);
    score
}

// ── Move picker ───────────────────────────────────────────────────────────────

/// Yields moves best-first by incremental selection.
///
/// Equal scores come out in generation order.
pub struct MovePicker {
    moves: Vec<(Move, i32)>,
    cursor: usize,
}

impl MovePicker {
    /// Score every move in `moves` against `ctx`.
    pub fn new(pos: &Position, moves: impl IntoIterator<Item = Move>, ctx: &OrderingContext) -> Self {
        Self {
            moves: moves
                .into_iter()
                .map(|mv| (mv, score_move(pos, mv, ctx)))
                .collect(),
            cursor: 0,
        }
    }

    /// The next best move and its ordering score.
    pub fn pick_next(&mut self) -> Option<(Move, i32)> {
        let rest = self.moves.get_mut(self.cursor..)?;
        let mut best = 0;
        for (i, &(_, score)) in rest.iter().enumerate().skip(1) {
            if score > rest[best].1 {
                best = i;
            }
        }
        let picked = *rest.get(best)?;
        // Rotate rather than swap so equal scores keep their order.
        rest[..=best].rotate_right(1);
        self.cursor += 1;
        Some(picked)
    }
}

impl Iterator for MovePicker {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        self.pick_next().map(|(mv, _)| mv)
    }
}

// ── Late-move reductions ──────────────────────────────────────────────────────

/// Side of the square reduction table.
pub const LMR_TABLE_SIZE: usize = 32;

/// Plies to reduce, indexed by `[remaining depth][move number]`.
#[rustfmt::skip]
const LMR_TABLE: [[u8; LMR_TABLE_SIZE]; LMR_TABLE_SIZE] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2],
    [0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    [0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3],
    [0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3],
    [0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3],
    [0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3],
    [0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3],
];

/// Reduction for the `move_number`-th move (1-based) at `depth`.
pub fn lmr_reduction(depth: i32, move_number: usize) -> i32 {
    let d = depth.clamp(0, LMR_TABLE_SIZE as i32 - 1) as usize;
    let m = move_number.min(LMR_TABLE_SIZE - 1);
    i32::from(LMR_TABLE[d][m])
}
