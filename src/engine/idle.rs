//! Idle reset timer
//!
//! A single countdown, restarted by every key press. The timer does not run
//! on its own: whoever drives the engine asks it whether the deadline has
//! passed, either right before handling the next key or when its wait for
//! the next key times out.

use std::time::{Duration, Instant};

/// Single outstanding idle deadline
#[derive(Debug, Clone)]
pub struct IdleTimer {
    /// Inactivity period
    timeout: Duration,
    /// When the buffer should be cleared, if armed
    deadline: Option<Instant>,
}

impl IdleTimer {
    /// Create a disarmed timer
    pub fn new(timeout: Duration) -> Self {
        IdleTimer {
            timeout,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and start a new countdown from `now`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = now.checked_add(self.timeout);
    }

    /// Cancel the pending deadline
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True once `now` has reached the deadline
    pub fn expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Time left until the deadline
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Pending deadline
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true while a deadline is pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Configured inactivity period
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
