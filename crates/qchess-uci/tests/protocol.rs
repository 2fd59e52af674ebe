//! End-to-end protocol tests: scripted input through `UciEngine::run`.

use std::io::{self, BufReader, Cursor, Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use qchess_core::Position;
use qchess_uci::{Output, UciEngine};

/// Collects everything the engine writes.
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

/// Script input that holds back end-of-file for a while, like a GUI that
/// waits for `bestmove` before hanging up.
struct LingeringInput {
    script: Cursor<Vec<u8>>,
    linger: Option<Duration>,
}

impl Read for LingeringInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.script.read(buf)?;
        if n == 0
            && let Some(delay) = self.linger.take()
        {
            thread::sleep(delay);
        }
        Ok(n)
    }
}

fn run_script(script: &str, linger: Option<Duration>) -> Vec<String> {
    run_bytes(script.as_bytes(), linger)
}

fn run_bytes(script: &[u8], linger: Option<Duration>) -> Vec<String> {
    let capture = Capture::default();
    let out: Output = Arc::new(Mutex::new(capture.clone()));
    let input = LingeringInput {
        script: Cursor::new(script.to_vec()),
        linger,
    };
    UciEngine::new(out).run(BufReader::new(input)).unwrap();

    let bytes = capture.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap().lines().map(str::to_string).collect()
}

fn bestmoves(lines: &[String]) -> Vec<&str> {
    lines
        .iter()
        .filter_map(|line| line.strip_prefix("bestmove "))
        .collect()
}

const WAIT: Option<Duration> = Some(Duration::from_secs(2));

#[test]
fn handshake() {
    let lines = run_script("uci\nisready\nquit\n", None);
    assert_eq!(lines[0], "id name qchess");
    assert!(lines[1].starts_with("id author "));
    assert_eq!(lines[2], "option name Hash type spin default 64 min 1 max 65536");
    assert_eq!(lines[3], "uciok");
    assert_eq!(lines[4], "readyok");
    assert_eq!(lines.len(), 5);
}

#[test]
fn depth_limited_search_reports_and_moves() {
    let lines = run_script("position startpos moves e2e4\ngo depth 3\n", WAIT);

    let infos: Vec<&String> = lines.iter().filter(|l| l.starts_with("info ")).collect();
    assert_eq!(infos.len(), 3);
    assert!(infos[2].contains(" depth 3 "));

    let moves = bestmoves(&lines);
    assert_eq!(moves.len(), 1);
    let mut pos = Position::startpos();
    pos.play_uci("e2e4").unwrap();
    assert!(pos.parse_uci_move(moves[0]).is_ok(), "{} is not a reply to e4", moves[0]);
    assert!(lines.last().unwrap().starts_with("bestmove "));
}

#[test]
fn finds_mate_and_reports_it() {
    let script = "position fen r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4\n\
                  go depth 3\n";
    let lines = run_script(script, WAIT);
    assert_eq!(bestmoves(&lines), vec!["h5f7"]);
    assert!(lines.iter().any(|l| l.contains("score mate 1 pv h5f7")));
}

#[test]
fn no_legal_moves_answers_null_move() {
    let lines = run_script("position fen 7k/6Q1/5K2/8/8/8/8/8 b - - 0 1\ngo depth 2\n", WAIT);
    assert_eq!(bestmoves(&lines), vec!["0000"]);
}

#[test]
fn stop_reports_exactly_one_move() {
    let lines = run_script("go infinite\nstop\nisready\n", None);
    let moves = bestmoves(&lines);
    assert_eq!(moves.len(), 1);
    assert!(Position::startpos().parse_uci_move(moves[0]).is_ok());
    // `stop` blocks until the move is out, so readyok comes after it.
    assert_eq!(lines.last().unwrap(), "readyok");
}

#[test]
fn quit_cancels_and_ignores_the_rest() {
    let lines = run_script("go infinite\nquit\nisready\n", None);
    assert_eq!(bestmoves(&lines).len(), 1);
    assert!(!lines.iter().any(|l| l == "readyok"));
}

#[test]
fn end_of_input_behaves_like_quit() {
    let lines = run_script("go infinite\n", None);
    assert_eq!(bestmoves(&lines).len(), 1);
}

#[test]
fn second_go_during_search_is_ignored() {
    let lines = run_script("go infinite\ngo depth 1\ngo movetime 10\nstop\n", None);
    assert_eq!(bestmoves(&lines).len(), 1);
}

#[test]
fn movetime_search_finishes_on_its_own() {
    let lines = run_script("go movetime 100\n", WAIT);
    assert_eq!(bestmoves(&lines).len(), 1);
}

#[test]
fn node_limited_search_finishes_on_its_own() {
    let lines = run_script("go nodes 5000\n", WAIT);
    assert_eq!(bestmoves(&lines).len(), 1);
}

#[test]
fn malformed_lines_get_no_response() {
    let script = "position banana\n\
                  position startpos moves e2e5\n\
                  go depth many\n\
                  setoption name Hash value 0\n\
                  setoption name Threads value 4\n\
                  xyzzy\n\
                  isready\n";
    let lines = run_script(script, None);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn setoption_and_new_game_between_searches() {
    let script = "setoption name Hash value 1\n\
                  position startpos moves d2d4\n\
                  ucinewgame\n\
                  go depth 1\n";
    let lines = run_script(script, WAIT);
    let moves = bestmoves(&lines);
    assert_eq!(moves.len(), 1);
    // ucinewgame put White back on move.
    assert!(Position::startpos().parse_uci_move(moves[0]).is_ok());
}

#[test]
fn invalid_utf8_line_is_skipped() {
    let lines = run_bytes(b"isready\n\xff\xfe junk\nisready\nquit\n", None);
    assert_eq!(lines, vec!["readyok".to_string(), "readyok".to_string()]);
}

#[test]
fn crlf_line_endings_are_accepted() {
    let lines = run_bytes(b"isready\r\nquit\r\n", None);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

/// Fails every read after handing out its script.
struct BrokenInput(Cursor<Vec<u8>>);

impl Read for BrokenInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone")),
            n => Ok(n),
        }
    }
}

#[test]
fn read_failure_ends_the_session_cleanly() {
    let capture = Capture::default();
    let out: Output = Arc::new(Mutex::new(capture.clone()));
    let input = BrokenInput(Cursor::new(b"go infinite\n".to_vec()));
    UciEngine::new(out).run(BufReader::new(input)).unwrap();

    let bytes = capture.0.lock().unwrap().clone();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("bestmove ")).count(), 1);
}
