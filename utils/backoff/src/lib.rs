//! Bounded retry with exponential backoff.
//!
//! Every call that leaves the process (embedding requests, store commits,
//! generation requests) is wrapped in a [`RetryPolicy`]. Errors decide for
//! themselves whether another attempt can help via the [`Transient`] trait:
//! transport-level failures are worth retrying, a malformed response is not.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Classifies an error as transient (retryable) or permanent.
pub trait Transient {
    /// Whether another attempt at the failed operation could succeed.
    fn is_transient(&self) -> bool;
}

/// A bounded exponential backoff policy.
///
/// The first attempt is immediate; each retry sleeps `base_delay * 2^n`,
/// capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never zero.
    max_attempts: u32,

    /// Delay before the first retry.
    base_delay: Duration,

    /// Upper bound on any single delay.
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given number of attempts and default delays.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// A policy that performs exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Set the delay before the first retry.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the upper bound on any single delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay to sleep after the given zero-based failed attempt.
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Run `op`, retrying transient failures until the attempt budget runs out.
    ///
    /// The last error is returned once attempts are exhausted or the error is
    /// permanent.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: Transient + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts || !err.is_transient() {
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt - 1);
                    warn!(
                        "attempt {attempt}/{} failed ({err}), retrying in {delay:?}",
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
