//! Search control: the shared stop flag plus time and node limits.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How often, in nodes, the hard time limit is checked.
const CLOCK_CHECK_INTERVAL: u64 = 2048;

/// Limits for one search. Every field is optional; an empty set searches
/// until stopped or the maximum depth is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Deepest iteration to run.
    pub depth: Option<i32>,
    /// Abort once this many nodes have been visited.
    pub nodes: Option<u64>,
    /// Do not start a new iteration after this much time.
    pub soft_time: Option<Duration>,
    /// Abort mid-iteration after this much time.
    pub hard_time: Option<Duration>,
}

impl SearchLimits {
    /// No limits at all.
    pub fn infinite() -> Self {
        Self::default()
    }
}

/// Decides when a running search must stop.
///
/// The stop flag is shared with the controller; `stop` from outside and the
/// hard time and node limits from inside all end the search by setting it.
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Instant,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
    node_limit: Option<u64>,
    /// Node count at which the clock is next read.
    next_clock_check: AtomicU64,
}

impl SearchControl {
    /// Control with the given limits; the clock starts now.
    pub fn new(stopped: Arc<AtomicBool>, limits: &SearchLimits) -> Self {
        Self {
            stopped,
            start: Instant::now(),
            soft_limit: limits.soft_time,
            hard_limit: limits.hard_time,
            node_limit: limits.nodes,
            next_clock_check: AtomicU64::new(CLOCK_CHECK_INTERVAL),
        }
    }

    /// Control that only answers to the stop flag.
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self::new(stopped, &SearchLimits::infinite())
    }

    /// Whether the search must abort now.
    ///
    /// The flag and the node limit are checked on every call, the clock
    /// once at least 2048 more nodes have been counted since it was last read. A tripped limit sets the flag so later calls
    /// return at once.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }

        if let Some(limit) = self.node_limit
            && nodes >= limit
        {
            self.stop();
            return true;
        }

        if nodes < self.next_clock_check.load(Ordering::Relaxed) {
            return false;
        }
        self.next_clock_check
            .store(nodes + CLOCK_CHECK_INTERVAL, Ordering::Relaxed);

        if let Some(hard) = self.hard_limit
            && self.elapsed() >= hard
        {
            self.stop();
            return true;
        }

        false
    }

    /// Whether iterative deepening should skip the next iteration.
    pub fn should_stop_iterating(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        self.soft_limit.is_some_and(|soft| self.elapsed() >= soft)
    }

    /// Raise the stop flag.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
