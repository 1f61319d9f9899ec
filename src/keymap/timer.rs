//! One-shot timer that forces resolution of ambiguous pending keys
//!
//! The timer is deadline based: the host polls it with the current time
//! (or sleeps until [`AmbiguityTimer::deadline`]) instead of the engine
//! owning a toolkit timer source. Arming always replaces the previous
//! deadline, so at most one is live.

use std::time::{Duration, Instant};

/// Default wait for more keys before an ambiguous sequence is resolved
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct AmbiguityTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl AmbiguityTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the wait; takes effect the next time the timer is armed
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Cancel any live deadline and schedule a new one at `now + timeout`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, zero if already due
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Disarm and return true if the deadline has passed
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for AmbiguityTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}
