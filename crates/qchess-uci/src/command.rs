//! UCI command parsing.

use std::time::Duration;

use qchess_core::Position;

use crate::error::UciError;

/// Smallest accepted `Hash` value in megabytes.
pub const HASH_MIN_MB: usize = 1;

/// Largest accepted `Hash` value in megabytes.
pub const HASH_MAX_MB: usize = 65_536;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` searches until `stop`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// White's remaining time.
    pub wtime: Option<Duration>,
    /// Black's remaining time.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Moves until next time control.
    pub movestogo: Option<u32>,
    /// Search to this depth only.
    pub depth: Option<i32>,
    /// Search for exactly this duration.
    pub movetime: Option<Duration>,
    /// Search this many nodes only.
    pub nodes: Option<u64>,
    /// Search until `stop` (no time limit).
    pub infinite: bool,
}

/// An engine option set through `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciOption {
    /// Transposition table size in megabytes.
    Hash(usize),
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset to the starting position.
    UciNewGame,
    /// `position` -- the root position with any moves already played.
    Position(Position),
    /// `go` -- start searching with given parameters.
    Go(GoParams),
    /// `setoption` -- change an engine option.
    SetOption(UciOption),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command (ignored, as UCI requires).
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(args),
        "go" => parse_go(args),
        "setoption" => parse_setoption(args),
        _ => Ok(Command::Unknown(head.to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
///
/// The FEN runs up to `moves` or the end of the line, so the move counters
/// may be left out.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let moves_at = tokens.iter().position(|&t| t == "moves").unwrap_or(tokens.len());
    let (setup, moves) = tokens.split_at(moves_at);

    let mut pos = match setup {
        ["startpos"] => Position::startpos(),
        ["fen", fen @ ..] if !fen.is_empty() => {
            let fen = fen.join(" ");
            Position::from_fen(&fen).map_err(|_| UciError::InvalidFen { fen })?
        }
        ["fen"] => return Err(UciError::InvalidFen { fen: String::new() }),
        _ => return Err(UciError::MalformedPosition),
    };

    for uci_str in moves.iter().skip(1) {
        pos.play_uci(uci_str).map_err(|_| UciError::InvalidMove {
            uci_move: uci_str.to_string(),
        })?;
    }

    Ok(Command::Position(pos))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, winc, binc, movestogo, depth, movetime,
/// nodes, infinite. Unknown tokens are silently skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        let value = tokens.get(i + 1);
        match tokens[i] {
            "wtime" => params.wtime = Some(parse_millis(value, "wtime")?),
            "btime" => params.btime = Some(parse_millis(value, "btime")?),
            "winc" => params.winc = Some(parse_millis(value, "winc")?),
            "binc" => params.binc = Some(parse_millis(value, "binc")?),
            "movestogo" => params.movestogo = Some(parse_int(value, "movestogo")?),
            "depth" => params.depth = Some(parse_int(value, "depth")?),
            "movetime" => params.movetime = Some(parse_millis(value, "movetime")?),
            "nodes" => params.nodes = Some(parse_int(value, "nodes")?),
            "infinite" => {
                params.infinite = true;
                i += 1;
                continue;
            }
            _ => {
                // Unknown token -- skip per UCI convention
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    Ok(Command::Go(params))
}

/// Parse `setoption name <name> [value <value>]`.
///
/// Option names are matched case-insensitively and may contain spaces.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    let Some(("name", rest)) = tokens.split_first().map(|(&head, rest)| (head, rest)) else {
        return Err(UciError::UnknownOption {
            name: tokens.join(" "),
        });
    };
    let value_at = rest.iter().position(|&t| t == "value").unwrap_or(rest.len());
    let name = rest[..value_at].join(" ");
    let value = rest.get(value_at + 1..).map(|v| v.join(" ")).unwrap_or_default();

    if !name.eq_ignore_ascii_case("hash") {
        return Err(UciError::UnknownOption { name });
    }

    match value.parse::<usize>() {
        Ok(mb) if (HASH_MIN_MB..=HASH_MAX_MB).contains(&mb) => {
            Ok(Command::SetOption(UciOption::Hash(mb)))
        }
        _ => Err(UciError::InvalidOptionValue { name, value }),
    }
}

/// Parse a millisecond value from a token.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    parse_int(token, param).map(Duration::from_millis)
}

/// Parse an integer value from a token.
fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}
