//! Retry with bounded exponential backoff.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// How to proceed after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Explicit retry policy: attempt cap, backoff curve and retryable predicate.
///
/// Attempt `n` (1-based) that fails with a retryable error waits
/// `clamp(multiplier * 2^(n-1), min_delay, max_delay)` before attempt `n + 1`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    multiplier: Duration,
    min_delay: Duration,
    max_delay: Duration,
    retryable: fn(&Error) -> bool,
}

impl RetryPolicy {
    /// Retries only [`Error::RateLimited`]: 100 attempts, 1s doubling up to 15s.
    pub fn rate_limit() -> Self {
        Self {
            max_attempts: 100,
            multiplier: Duration::from_secs(1),
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(15),
            retryable: Error::is_rate_limited,
        }
    }

    /// Total attempts including the first. Zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, multiplier: Duration, min: Duration, max: Duration) -> Self {
        self.multiplier = multiplier;
        self.min_delay = min;
        self.max_delay = max.max(min);
        self
    }

    pub fn with_retryable(mut self, retryable: fn(&Error) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.multiplier
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .clamp(self.min_delay, self.max_delay)
    }

    pub fn decide(&self, attempt: u32, err: &Error) -> Decision {
        if !(self.retryable)(err) || attempt >= self.max_attempts {
            return Decision::Fail;
        }
        Decision::Retry {
            delay: self.backoff(attempt),
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, runs out
    /// of attempts or `cancel` fires. `op` receives the 1-based attempt number.
    ///
    /// On exhaustion the last error is returned with the attempt count recorded.
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled { attempts: attempt });
            }
            attempt += 1;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled { attempts: attempt }),
                outcome = op(attempt) => outcome,
            };
            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            match self.decide(attempt, &err) {
                Decision::Fail => return Err(err.with_attempts(attempt)),
                Decision::Retry { delay } => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        wait_secs = delay.as_secs_f64(),
                        error = %err,
                        "retrying after failed attempt"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(Error::Cancelled { attempts: attempt }),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::rate_limit()
    }
}
