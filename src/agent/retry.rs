//! Whole-turn retry policy

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use tracing::warn;

use crate::config::AgentConfig;
use crate::error::Result;

/// Retries a failed operation with exponential backoff, a fixed number of
/// attempts in total.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_interval: Duration,
    max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(5))
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, initial_interval: Duration, max_interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_interval,
            max_interval,
        }
    }

    /// Policy from the agent configuration
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_initial_interval_ms),
            Duration::from_millis(config.retry_max_interval_ms),
        )
    }

    /// Same attempt budget, no waiting between attempts
    #[cfg(test)]
    pub(crate) fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    /// Total attempts, first try included
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    ///
    /// The error of the last attempt is returned.
    pub async fn retry<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = AtomicU32::new(0);
        let max_attempts = self.max_attempts;

        backoff::future::retry(self.backoff(), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let fut = operation();
            async move {
                fut.await.map_err(|e| {
                    let transient = e.is_retryable();
                    if attempt >= max_attempts {
                        warn!(
                            "{} failed after {} attempt(s) (transient: {}): {}",
                            label, attempt, transient, e
                        );
                        backoff::Error::permanent(e)
                    } else {
                        warn!(
                            "{} attempt {}/{} failed (transient: {}), retrying: {}",
                            label, attempt, max_attempts, transient, e
                        );
                        backoff::Error::transient(e)
                    }
                })
            }
        })
        .await
    }
}
