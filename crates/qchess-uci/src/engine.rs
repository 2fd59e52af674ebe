//! The UCI engine: a synchronous command loop with one search worker.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use qchess_core::Position;
use qchess_engine::{DEFAULT_HASH_MB, SearchControl, SearchLimits, Searcher, limits_from_go};

use crate::command::{Command, GoParams, HASH_MAX_MB, HASH_MIN_MB, UciOption, parse_command};
use crate::error::UciError;

/// Engine name reported to `uci`.
pub const ENGINE_NAME: &str = "qchess";

/// Engine author reported to `uci`.
pub const ENGINE_AUTHOR: &str = "the qchess developers";

/// Where protocol output goes. Shared with the search worker, which writes
/// `info` and `bestmove` lines itself.
pub type Output = Arc<Mutex<dyn Write + Send>>;

/// Configuration knobs adjustable via `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
        }
    }
}

/// The UCI engine, holding the root position and the search tables.
///
/// Commands run on the calling thread; a search runs on a worker thread
/// that owns the [`Searcher`] until it is joined.
pub struct UciEngine {
    position: Position,
    config: EngineConfig,
    /// `None` while the worker holds it.
    searcher: Option<Searcher>,
    worker: Option<JoinHandle<Searcher>>,
    stop_flag: Arc<AtomicBool>,
    out: Output,
}

impl UciEngine {
    /// Create an engine at the starting position writing to `out`.
    pub fn new(out: Output) -> Self {
        Self::with_config(out, EngineConfig::default())
    }

    pub fn with_config(out: Output, config: EngineConfig) -> Self {
        Self {
            position: Position::startpos(),
            config,
            searcher: Some(Searcher::new(config.hash_mb)),
            worker: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            out,
        }
    }

    /// The current root position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Whether a search is still running.
    pub fn is_searching(&self) -> bool {
        self.worker.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Read commands from `input` until `quit`, end of input or a read
    /// failure.
    ///
    /// Malformed lines, including ones that are not valid UTF-8, are logged
    /// and skipped. Any running search is stopped, and its move reported,
    /// before returning.
    pub fn run<R: BufRead>(mut self, mut input: R) -> Result<(), UciError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "input closed");
                    break;
                }
            }
            let line = String::from_utf8_lossy(&buf);
            if self.execute(&line)?.is_break() {
                break;
            }
        }
        self.stop_search();
        info!("{ENGINE_NAME} shutting down");
        Ok(())
    }

    /// Handle one line of input. Breaks on `quit`.
    pub fn execute(&mut self, line: &str) -> Result<ControlFlow<()>, UciError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ControlFlow::Continue(()));
        }
        debug!(cmd = %line, "received UCI command");

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, line, "ignoring malformed command");
                return Ok(ControlFlow::Continue(()));
            }
        };

        match command {
            Command::Uci => self.handle_uci()?,
            Command::IsReady => self.send("readyok")?,
            Command::UciNewGame => self.handle_ucinewgame(),
            Command::Position(pos) => self.handle_position(pos),
            Command::Go(params) => self.handle_go(params)?,
            Command::SetOption(option) => self.handle_setoption(option),
            Command::Stop => self.stop_search(),
            Command::Quit => {
                self.stop_search();
                return Ok(ControlFlow::Break(()));
            }
            Command::Unknown(cmd) => debug!(cmd, "unknown command"),
        }
        Ok(ControlFlow::Continue(()))
    }

    fn handle_uci(&self) -> Result<(), UciError> {
        self.send(format_args!("id name {ENGINE_NAME}"))?;
        self.send(format_args!("id author {ENGINE_AUTHOR}"))?;
        self.send(format_args!(
            "option name Hash type spin default {DEFAULT_HASH_MB} min {HASH_MIN_MB} max {HASH_MAX_MB}"
        ))?;
        self.send("uciok")
    }

    fn handle_ucinewgame(&mut self) {
        self.position = Position::startpos();
        if !self.is_searching() {
            self.reclaim_searcher();
            if let Some(searcher) = self.searcher.as_mut() {
                searcher.clear();
            }
        }
    }

    fn handle_position(&mut self, pos: Position) {
        if self.is_searching() {
            debug!("position ignored while searching");
            return;
        }
        self.position = pos;
    }

    fn handle_setoption(&mut self, option: UciOption) {
        if self.is_searching() {
            debug!(?option, "setoption ignored while searching");
            return;
        }
        match option {
            UciOption::Hash(mb) => {
                self.config.hash_mb = mb;
                self.reclaim_searcher();
                if let Some(searcher) = self.searcher.as_mut() {
                    searcher.resize_tt(mb);
                }
                info!(hash_mb = mb, "transposition table resized");
            }
        }
    }

    fn handle_go(&mut self, params: GoParams) -> Result<(), UciError> {
        if self.is_searching() {
            warn!("go received while searching, ignoring");
            return Ok(());
        }
        self.reclaim_searcher();

        let mut searcher = self
            .searcher
            .take()
            .unwrap_or_else(|| Searcher::new(self.config.hash_mb));

        let limits = SearchLimits {
            depth: params.depth,
            nodes: params.nodes,
            ..limits_from_go(
                params.wtime,
                params.btime,
                params.winc,
                params.binc,
                params.movestogo,
                params.movetime,
                params.infinite,
                self.position.side_to_move(),
            )
        };
        debug!(?limits, "starting search");

        self.stop_flag = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&self.stop_flag);
        let position = self.position.clone();
        let out = Arc::clone(&self.out);

        let handle = thread::Builder::new()
            .name("search".to_string())
            .spawn(move || {
                let control = SearchControl::new(stop_flag, &limits);
                let result = searcher.search(&position, limits.depth, &control, |info| {
                    report(&out, info);
                });
                match result.best_move {
                    Some(mv) => report(&out, format_args!("bestmove {mv}")),
                    None => report(&out, "bestmove 0000"),
                }
                searcher
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Cancel the running search, if any, and wait until it has reported
    /// its move.
    pub fn stop_search(&mut self) {
        if self.worker.is_some() {
            self.stop_flag.store(true, Ordering::Release);
            self.reclaim_searcher();
        }
    }

    /// Join a worker and take its searcher back.
    fn reclaim_searcher(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        match handle.join() {
            Ok(searcher) => self.searcher = Some(searcher),
            Err(_) => {
                warn!("search thread panicked; starting with fresh tables");
                self.searcher = None;
            }
        }
    }

    fn send(&self, line: impl Display) -> Result<(), UciError> {
        write_line(&self.out, line)?;
        Ok(())
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        self.stop_search();
    }
}

fn write_line(out: &Output, line: impl Display) -> io::Result<()> {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    writeln!(out, "{line}")?;
    out.flush()
}

/// Write from the worker, where there is no caller to hand an error to.
fn report(out: &Output, line: impl Display) {
    if let Err(e) = write_line(out, line) {
        warn!(error = %e, "failed to write search output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn engine() -> (UciEngine, Capture) {
        let capture = Capture::default();
        let out: Output = Arc::new(Mutex::new(capture.clone()));
        (UciEngine::new(out), capture)
    }

    #[test]
    fn ucinewgame_resets_the_root() {
        let (mut engine, _) = engine();
        engine.execute("position startpos moves e2e4").unwrap();
        assert_ne!(engine.position(), &Position::startpos());
        engine.execute("ucinewgame").unwrap();
        assert_eq!(engine.position(), &Position::startpos());
    }

    #[test]
    fn setoption_hash_updates_config() {
        let (mut engine, out) = engine();
        engine.execute("setoption name Hash value 2").unwrap();
        assert_eq!(engine.config().hash_mb, 2);
        assert!(out.lines().is_empty());
    }

    #[test]
    fn malformed_lines_are_silent() {
        let (mut engine, out) = engine();
        for line in ["position banana", "go depth x", "setoption name Hash value 0", "hello"] {
            assert!(engine.execute(line).unwrap().is_continue());
        }
        assert!(out.lines().is_empty());
        assert_eq!(engine.position(), &Position::startpos());
    }

    #[test]
    fn quit_breaks_the_loop() {
        let (mut engine, _) = engine();
        assert!(engine.execute("quit").unwrap().is_break());
    }

    #[test]
    fn stop_waits_for_bestmove() {
        let (mut engine, out) = engine();
        engine.execute("go infinite").unwrap();
        assert!(engine.worker.is_some());
        engine.execute("stop").unwrap();
        assert!(!engine.is_searching());
        let lines = out.lines();
        let bestmoves: Vec<_> = lines.iter().filter(|l| l.starts_with("bestmove ")).collect();
        assert_eq!(bestmoves.len(), 1);
        assert_ne!(bestmoves[0], "bestmove 0000");
    }

    #[test]
    fn go_while_searching_is_ignored() {
        let (mut engine, out) = engine();
        engine.execute("go infinite").unwrap();
        engine.execute("go depth 1").unwrap();
        engine.execute("position startpos moves e2e4").unwrap();
        engine.execute("stop").unwrap();
        let count = out.lines().iter().filter(|l| l.starts_with("bestmove ")).count();
        assert_eq!(count, 1);
        assert_eq!(engine.position(), &Position::startpos());
    }

    #[test]
    fn stop_without_search_is_harmless() {
        let (mut engine, out) = engine();
        engine.execute("stop").unwrap();
        assert!(out.lines().is_empty());
    }
}
