//! Time control and search limits.
//!
//! A timeout is not an error: the search polls the clock every few thousand
//! nodes, and once the budget is spent it unwinds and reports the last fully
//! completed depth.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// What a caller allows one search to spend.
///
/// Engines stop at whichever limit comes first. When time runs out they
/// return the best move of the deepest completed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum search depth in plies (half-moves)
    pub depth: u8,
    /// Maximum time allowed for this move (None = infinite)
    pub move_time: Option<Duration>,
}

impl SearchLimits {
    /// Create limits with only depth constraint (no time limit).
    pub fn depth(depth: u8) -> Self {
        Self {
            depth,
            move_time: None,
        }
    }

    /// Create limits with both depth and time constraints.
    pub fn depth_and_time(depth: u8, move_time: Duration) -> Self {
        Self {
            depth,
            move_time: Some(move_time),
        }
    }

    /// Create limits with only time constraint (infinite depth).
    pub fn time(move_time: Duration) -> Self {
        Self {
            depth: u8::MAX,
            move_time: Some(move_time),
        }
    }

    /// A clock for these limits, not yet started.
    pub fn clock(&self) -> TimeControl {
        TimeControl::new(self.move_time)
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::depth(4)
    }
}

/// Deadline clock for a single search.
///
/// Reading the clock costs a syscall, so callers ask [`TimeControl::should_check_time`]
/// first and only read it every `check_interval` nodes. Once the deadline has
/// been seen the clock stays stopped until the next [`TimeControl::start`].
#[derive(Debug, Clone)]
pub struct TimeControl {
    started: Option<Instant>,
    time_limit: Option<Duration>,
    check_interval: u64,
    stopped: Cell<bool>,
}

impl TimeControl {
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self {
            started: None,
            time_limit,
            check_interval: 1024,
            stopped: Cell::new(false),
        }
    }

    /// Override how many nodes pass between clock reads.
    pub fn with_check_interval(mut self, nodes: u64) -> Self {
        self.check_interval = nodes.max(1);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Start (or restart) the clock.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.stopped.set(false);
    }

    pub fn stop(&self) {
        self.stopped.set(true);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    /// Read the clock and latch the stop flag if the deadline has passed.
    pub fn check_time(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        match (self.time_limit, self.started) {
            (Some(limit), Some(start)) if start.elapsed() >= limit => {
                self.stop();
                true
            }
            _ => false,
        }
    }

    /// True every `check_interval` nodes.
    #[inline]
    pub fn should_check_time(&self, nodes: u64) -> bool {
        nodes % self.check_interval == 0
    }

    /// Time since [`TimeControl::start`]; zero before it.
    pub fn elapsed(&self) -> Duration {
        self.started.map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// True once more than `fraction` of the budget is gone. Iterative
    /// deepening uses this to avoid starting a depth it cannot finish.
    pub fn used_fraction_exceeds(&self, fraction: f64) -> bool {
        match self.time_limit {
            Some(limit) => self.elapsed().as_secs_f64() >= limit.as_secs_f64() * fraction,
            None => false,
        }
    }

    /// Time left before the deadline (None without a limit).
    pub fn remaining(&self) -> Option<Duration> {
        self.time_limit.map(|limit| limit.saturating_sub(self.elapsed()))
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
#[path = "time_control_tests.rs"]
mod time_control_tests;
