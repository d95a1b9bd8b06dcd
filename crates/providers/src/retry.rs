//! Retry policy for the chat completion client.
//!
//! Separated from the transport so the backoff schedule is testable
//! without a clock or a network. The schedule is linear and keyed by
//! status class: rate limiting backs off proportionally to the attempt
//! number, server errors retry after a fixed second, timeouts retry only
//! while budget remains.

use std::time::Duration;

/// Bounded retry schedule. Total attempts = `max_retries + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
}

impl RetryPolicy {
    pub fn new(max_retries: usize) -> Self {
        Self { max_retries }
    }

    /// Attempts the client may make in total, including the first.
    pub fn total_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Backoff before retrying a given HTTP status, or `None` when the
    /// status is not retryable. `attempt` is zero-based.
    pub fn backoff_for_status(&self, status: u16, attempt: usize) -> Option<Duration> {
        match status {
            429 => Some(Duration::from_secs(attempt as u64 + 1)),
            s if s >= 500 => Some(Duration::from_secs(1)),
            _ => None,
        }
    }

    /// Backoff before retrying after a request timeout, or `None` once the
    /// retry budget is spent.
    pub fn backoff_for_timeout(&self, attempt: usize) -> Option<Duration> {
        if attempt < self.max_retries {
            Some(Duration::from_secs(1))
        } else {
            None
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}
