//! Retry policy for chunk fetches.
//!
//! Every failed attempt is retried until the attempt budget runs out, except
//! cancellation, which is terminal. Delays are optional: with a zero base
//! delay (the default) the next attempt starts immediately.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use rangedl_core::download::{DownloadError, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::new(3, Duration::ZERO);
//! let error = DownloadError::http_status("https://example.com/f", "bytes=0-9", 503);
//!
//! match policy.should_retry(&error, 1) {
//!     RetryDecision::Retry { delay, attempt } => assert_eq!((delay, attempt), (Duration::ZERO, 2)),
//!     RetryDecision::DoNotRetry { reason } => panic!("{reason}"),
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::debug;

use super::DownloadError;
use super::constants::{DEFAULT_MAX_RETRIES, MAX_JITTER, MAX_RETRY_DELAY};

/// Backoff multiplier applied per attempt.
const BACKOFF_MULTIPLIER: u32 = 2;

/// Decision on whether to retry a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after `delay`.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// The attempt number about to run (1-indexed).
        attempt: u32,
    },

    /// Give up and surface the error.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Attempt budget and backoff for chunk fetches.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay before the first retry; doubled for each further retry.
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, Duration::ZERO)
    }
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` attempts (at least one).
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Returns the maximum number of attempts.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides what to do after attempt `attempt` (1-indexed) failed with `error`.
    #[must_use]
    pub fn should_retry(&self, error: &DownloadError, attempt: u32) -> RetryDecision {
        if error.is_cancelled() {
            return RetryDecision::DoNotRetry {
                reason: "cancelled".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            delay: self.calculate_delay(attempt),
            attempt: attempt + 1,
        }
    }

    /// `min(base * 2^(attempt-1), MAX_RETRY_DELAY) + jitter`, or zero when no
    /// base delay is configured.
    fn calculate_delay(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let factor = BACKOFF_MULTIPLIER.saturating_pow(attempt.saturating_sub(1));
        let delay = self
            .base_delay
            .saturating_mul(factor)
            .min(MAX_RETRY_DELAY);
        delay + jitter()
    }
}

fn jitter() -> Duration {
    let max_ms = u64::try_from(MAX_JITTER.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}
