//! A history-aware position: board state plus the counters and hash trail
//! needed for reversible search and draw detection.

use std::fmt;
use std::str::FromStr;

use chess::{BitBoard, Board, BoardStatus, Color, MoveGen, Piece, Square, EMPTY};

use crate::error::CoreError;
use crate::moves::{self, Move, MoveKind, MoveList};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Why a game has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOver {
    /// The side to move is checkmated.
    Checkmate,
    /// The side to move has no legal moves and is not in check.
    Stalemate,
    /// Neither side can deliver mate.
    InsufficientMaterial,
    /// The current position occurred for the third time.
    Repetition,
    /// One hundred halfmoves without a capture or pawn move.
    FiftyMove,
}

impl GameOver {
    /// Whether the side to move has lost.
    pub fn is_checkmate(self) -> bool {
        self == GameOver::Checkmate
    }
}

/// State restored by [`Position::undo`].
#[derive(Clone, Copy, PartialEq, Eq)]
struct Undo {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// A chess position with reversible apply/undo.
///
/// Every [`play`](Position::play) or [`play_null`](Position::play_null) is
/// matched by one [`undo`](Position::undo); after the pair the position is
/// equal to what it was before.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    /// Hashes of every earlier position, oldest first.
    history: Vec<u64>,
    undo: Vec<Undo>,
}

impl Position {
    /// The standard starting position.
    pub fn startpos() -> Position {
        Position::from_board(Board::default(), 0, 1)
    }

    /// Wrap a bare board with explicit move counters and no history.
    pub fn from_board(board: Board, halfmove_clock: u32, fullmove_number: u32) -> Position {
        Position {
            board,
            halfmove_clock,
            fullmove_number: fullmove_number.max(1),
            history: Vec::new(),
            undo: Vec::new(),
        }
    }

    /// Parse a FEN string. The two move counters are optional.
    pub fn from_fen(fen: &str) -> Result<Position, CoreError> {
        let board = Board::from_str(fen).map_err(|_| CoreError::InvalidFen {
            fen: fen.to_string(),
        })?;

        let mut fields = fen.split_whitespace().skip(4);
        let halfmove_clock = parse_counter(fields.next(), "halfmove clock", 0)?;
        let fullmove_number = parse_counter(fields.next(), "fullmove number", 1)?;

        Ok(Position::from_board(board, halfmove_clock, fullmove_number))
    }

    /// The position as a six-field FEN string.
    pub fn fen(&self) -> String {
        let board = self.board.to_string();
        let placement: Vec<&str> = board.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            placement.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// The underlying board.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// Zobrist hash of the current board.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.board.get_hash()
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Number of moves (including passes) played since construction.
    #[inline]
    pub fn plies_played(&self) -> usize {
        self.undo.len()
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.board.piece_on(sq)
    }

    #[inline]
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.board.color_on(sq)
    }

    /// Pieces of one kind and color.
    #[inline]
    pub fn pieces(&self, piece: Piece, color: Color) -> BitBoard {
        *self.board.pieces(piece) & *self.board.color_combined(color)
    }

    /// Whether the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        *self.board.checkers() != EMPTY
    }

    /// All legal moves in generation order.
    pub fn legal_moves(&self) -> MoveList {
        MoveGen::new_legal(&self.board).collect()
    }

    /// Whether `mv` is legal here.
    #[inline]
    pub fn is_legal(&self, mv: Move) -> bool {
        self.board.legal(mv)
    }

    /// Whether playing `mv` puts the opponent in check.
    pub fn gives_check(&self, mv: Move) -> bool {
        *self.board.make_move_new(mv).checkers() != EMPTY
    }

    pub fn move_kind(&self, mv: Move) -> MoveKind {
        moves::classify(&self.board, mv)
    }

    /// Whether `mv` removes an enemy piece (en passant included).
    pub fn is_capture(&self, mv: Move) -> bool {
        moves::captured_piece(&self.board, mv).is_some()
    }

    /// The piece `mv` removes, if any.
    pub fn captured_piece(&self, mv: Move) -> Option<Piece> {
        moves::captured_piece(&self.board, mv)
    }

    /// The piece standing on the origin square of `mv`.
    pub fn moved_piece(&self, mv: Move) -> Option<Piece> {
        self.board.piece_on(mv.get_source())
    }

    // ── Apply / undo ────────────────────────────────────────────────────

    /// Play a legal move.
    pub fn play(&mut self, mv: Move) {
        let resets_clock =
            self.moved_piece(mv) == Some(Piece::Pawn) || self.is_capture(mv);
        self.push_undo();

        if self.board.side_to_move() == Color::Black {
            self.fullmove_number += 1;
        }
        self.halfmove_clock = if resets_clock { 0 } else { self.halfmove_clock + 1 };
        self.board = self.board.make_move_new(mv);
    }

    /// Pass the turn to the opponent.
    pub fn play_null(&mut self) -> Result<(), CoreError> {
        let passed = self.board.null_move().ok_or(CoreError::NullMoveInCheck)?;
        self.push_undo();
        self.halfmove_clock += 1;
        self.board = passed;
        Ok(())
    }

    /// Take back the last move or pass. Does nothing at the root.
    pub fn undo(&mut self) {
        if let Some(prev) = self.undo.pop() {
            self.history.pop();
            self.board = prev.board;
            self.halfmove_clock = prev.halfmove_clock;
            self.fullmove_number = prev.fullmove_number;
        }
    }

    /// Parse a UCI move string (`e2e4`, `e7e8q`) against the legal moves.
    pub fn parse_uci_move(&self, uci: &str) -> Result<Move, CoreError> {
        MoveGen::new_legal(&self.board)
            .find(|mv| mv.to_string() == uci)
            .ok_or_else(|| CoreError::IllegalMove {
                uci_move: uci.to_string(),
            })
    }

    /// Parse and play a UCI move string.
    pub fn play_uci(&mut self, uci: &str) -> Result<Move, CoreError> {
        let mv = self.parse_uci_move(uci)?;
        self.play(mv);
        Ok(mv)
    }

    fn push_undo(&mut self) {
        self.undo.push(Undo {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });
        self.history.push(self.board.get_hash());
    }

    // ── Draw and game-over detection ───────────────────────────────────

    /// Whether the current position already occurred `count` times since
    /// the last irreversible move.
    pub fn is_repetition(&self, count: usize) -> bool {
        let size = self.history.len() as i64;
        let oldest = size - i64::from(self.halfmove_clock) - 1;
        let current = self.hash();

        let mut seen = 0;
        let mut i = size - 2;
        while i >= 0 && i >= oldest {
            if self.history[i as usize] == current {
                seen += 1;
                if seen >= count {
                    return true;
                }
            }
            i -= 2;
        }
        false
    }

    /// One hundred halfmoves without a capture or pawn move.
    #[inline]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Bare kings, a single minor piece, or one bishop each on same-colored
    /// squares.
    pub fn is_insufficient_material(&self) -> bool {
        let occupied = *self.board.combined();
        match occupied.popcnt() {
            2 => true,
            3 => {
                let minors = *self.board.pieces(Piece::Knight) | *self.board.pieces(Piece::Bishop);
                minors != EMPTY
            }
            4 => {
                let white = self.pieces(Piece::Bishop, Color::White);
                let black = self.pieces(Piece::Bishop, Color::Black);
                if white.popcnt() != 1 || black.popcnt() != 1 {
                    return false;
                }
                let shade = |bb: BitBoard| {
                    let sq = bb.to_square();
                    (sq.get_rank().to_index() + sq.get_file().to_index()) % 2
                };
                shade(white) == shade(black)
            }
            _ => false,
        }
    }

    /// Why the game is over, or `None` if play continues.
    ///
    /// Checkmate on the hundredth halfmove takes precedence over the
    /// fifty-move draw.
    pub fn game_over(&self) -> Option<GameOver> {
        let status = self.board.status();
        if self.is_fifty_move_draw() {
            return Some(if status == BoardStatus::Checkmate {
                GameOver::Checkmate
            } else {
                GameOver::FiftyMove
            });
        }
        if self.is_insufficient_material() {
            return Some(GameOver::InsufficientMaterial);
        }
        if self.is_repetition(2) {
            return Some(GameOver::Repetition);
        }
        match status {
            BoardStatus::Ongoing => None,
            BoardStatus::Stalemate => Some(GameOver::Stalemate),
            BoardStatus::Checkmate => Some(GameOver::Checkmate),
        }
    }
}

fn parse_counter(token: Option<&str>, field: &'static str, default: u32) -> Result<u32, CoreError> {
    match token {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| CoreError::InvalidMoveCounter {
            field,
            found: raw.to_string(),
        }),
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::startpos()
    }
}

impl FromStr for Position {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.fen())
            .field("plies_played", &self.undo.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(pos: &mut Position, line: &[&str]) {
        for uci in line {
            pos.play_uci(uci).unwrap();
        }
    }

    #[test]
    fn startpos_round_trips_through_fen() {
        let pos = Position::startpos();
        assert_eq!(pos.fen(), STARTING_FEN);
        assert_eq!(Position::from_fen(STARTING_FEN).unwrap(), pos);
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn fen_without_counters_uses_defaults() {
        let pos = Position::from_fen("8/8/8/8/8/8/8/K6k w - -").unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
    }

    #[test]
    fn invalid_fen_is_rejected() {
        assert!(matches!(
            Position::from_fen("not a fen"),
            Err(CoreError::InvalidFen { .. })
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/K6k w - - x 1"),
            Err(CoreError::InvalidMoveCounter { .. })
        ));
    }

    #[test]
    fn play_then_undo_restores_everything() {
        let mut pos = Position::startpos();
        let before = pos.clone();
        play_all(&mut pos, &["e2e4", "e7e5", "g1f3"]);
        assert_eq!(pos.fullmove_number(), 2);
        assert_eq!(pos.halfmove_clock(), 1);
        pos.undo();
        pos.undo();
        pos.undo();
        assert_eq!(pos, before);
        pos.undo();
        assert_eq!(pos, before);
    }

    #[test]
    fn null_move_flips_side_and_undoes() {
        let mut pos = Position::startpos();
        let before = pos.clone();
        pos.play_null().unwrap();
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_ne!(pos.hash(), before.hash());
        pos.undo();
        assert_eq!(pos, before);
    }

    #[test]
    fn null_move_in_check_is_refused() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/4q3/4K3 w - - 0 1").unwrap();
        assert!(pos.in_check());
        assert_eq!(pos.play_null(), Err(CoreError::NullMoveInCheck));
        assert_eq!(pos.plies_played(), 0);
    }

    #[test]
    fn knight_shuffle_repeats() {
        let mut pos = Position::startpos();
        play_all(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert!(pos.is_repetition(1));
        assert!(!pos.is_repetition(2));
        assert_eq!(pos.game_over(), None);

        play_all(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert!(pos.is_repetition(2));
        assert_eq!(pos.game_over(), Some(GameOver::Repetition));
    }

    #[test]
    fn pawn_move_cuts_repetition_window() {
        let mut pos = Position::startpos();
        play_all(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8", "e2e4"]);
        assert!(!pos.is_repetition(1));
    }

    #[test]
    fn fifty_move_rule() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 100 80").unwrap();
        assert!(pos.is_fifty_move_draw());
        assert_eq!(pos.game_over(), Some(GameOver::FiftyMove));
    }

    #[test]
    fn checkmate_beats_fifty_move_rule() {
        let pos = Position::from_fen("R3k3/8/4K3/8/8/8/8/8 b - - 100 80").unwrap();
        assert_eq!(pos.game_over(), Some(GameOver::Checkmate));
    }

    #[test]
    fn insufficient_material_cases() {
        let bare = Position::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(bare.is_insufficient_material());

        let knight = Position::from_fen("8/8/8/4k3/8/8/8/3NK3 w - - 0 1").unwrap();
        assert!(knight.is_insufficient_material());

        let same_shade = Position::from_fen("8/8/8/2b1k3/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(same_shade.is_insufficient_material());
        let opposite_shades = Position::from_fen("8/8/8/3bk3/8/8/8/2B1K3 w - - 0 1").unwrap();
        assert!(!opposite_shades.is_insufficient_material());

        let rook = Position::from_fen("8/8/8/4k3/8/8/8/3RK3 w - - 0 1").unwrap();
        assert!(!rook.is_insufficient_material());
    }

    #[test]
    fn stalemate_and_checkmate() {
        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(stalemate.game_over(), Some(GameOver::Stalemate));

        let mate = Position::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(mate.game_over(), Some(GameOver::Checkmate));
        assert!(mate.in_check());
    }

    #[test]
    fn illegal_uci_move_is_an_error() {
        let pos = Position::startpos();
        assert!(pos.parse_uci_move("e2e5").is_err());
        assert!(pos.parse_uci_move("zz").is_err());
        assert_eq!(pos.parse_uci_move("e2e4").unwrap().to_string(), "e2e4");
    }

    #[test]
    fn gives_check_detects_checks() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(pos.gives_check(pos.parse_uci_move("a1a8").unwrap()));
        assert!(!pos.gives_check(pos.parse_uci_move("a1a2").unwrap()));
    }
}
