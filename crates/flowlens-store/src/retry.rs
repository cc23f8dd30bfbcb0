//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Retry schedule for platform requests.
///
/// Attempt `n` (1-based) waits `initial_backoff * 2^(n-2)` before starting,
/// capped at `max_backoff`; the first attempt starts immediately. Every
/// attempt is bounded by `attempt_timeout`, and an elapsed deadline counts as
/// a transient failure.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1 = the second attempt)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or `max_attempts` attempts have failed transiently. The last case
    /// yields [`Error::Unavailable`].
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.backoff_for(attempt - 1);
                debug!(
                    "{}: retrying after {}ms (attempt {}/{})",
                    label,
                    delay.as_millis(),
                    attempt,
                    attempts
                );
                tokio::time::sleep(delay).await;
            }

            match tokio::time::timeout(self.attempt_timeout, operation()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if e.is_retryable() => {
                    warn!("{}: attempt {}/{} failed: {}", label, attempt, attempts, e);
                    last_reason = e.to_string();
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(
                        "{}: attempt {}/{} timed out after {}s",
                        label,
                        attempt,
                        attempts,
                        self.attempt_timeout.as_secs_f64()
                    );
                    last_reason = format!(
                        "request timed out after {}s",
                        self.attempt_timeout.as_secs_f64()
                    );
                }
            }
        }

        Err(Error::Unavailable {
            attempts,
            reason: last_reason,
        })
    }
}
