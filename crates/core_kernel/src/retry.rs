//! Retry policy for transient failures
//!
//! A policy only describes *when* to retry; running the retried unit is the
//! caller's job (see `domain_property::transaction`). Delays grow
//! exponentially from `base_delay` and are capped at `max_delay`.

use std::time::Duration;

use crate::ports::PortError;

/// How many times, and how far apart, a failed unit of work is re-run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Runs the unit exactly once
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Creates a policy with exponential backoff
    pub const fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Returns true when `attempt` (1-based) may be followed by another one
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Returns true when the error is worth another attempt
    pub fn should_retry(&self, attempt: u32, error: &PortError) -> bool {
        error.is_transient() && self.allows_retry_after(attempt)
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let factor = 1u32 << exponent;
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    /// Three attempts, 100 ms doubling up to 2 s
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100), Duration::from_secs(2))
    }
}
