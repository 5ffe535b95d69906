//! Polling policy and per-attempt progress reporting

use std::time::Duration;

use crate::types::RetrievalStatus;
use crate::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};

/// Fixed-interval polling budget
///
/// The client sleeps `interval` after every attempt that did not reach a
/// terminal status and gives up after `max_attempts` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status requests
    pub max_attempts: u32,
    /// Wait between requests
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    /// Create a policy with the given budget
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Set maximum attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set wait between attempts
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// What a single status request produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Server answered with a status
    Status {
        status: RetrievalStatus,
        message: String,
    },
    /// Request failed; polling continues
    Error(String),
}

/// Progress report handed to the poll observer after every attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollAttempt {
    /// 1-based attempt index
    pub attempt: u32,
    /// Budget the attempt counts against
    pub max_attempts: u32,
    /// Result of the attempt
    pub outcome: PollOutcome,
}

impl PollAttempt {
    /// `[attempt/max]` prefix used in progress output
    pub fn counter(&self) -> String {
        format!("[{}/{}]", self.attempt, self.max_attempts)
    }
}
