//! Bounded timeout and retry for store calls.
//!
//! Only `DomainError::StoreUnavailable` is retried. Each attempt runs under
//! its own timeout, and a timeout counts as `StoreUnavailable`. Waits between
//! attempts grow exponentially with jitter.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use ec_shared::config::DatabaseConfig;

use crate::errors::{DomainError, DomainResult};

/// Retry and timeout settings for store operations
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Upper bound for a single attempt
    pub operation_timeout: Duration,
    /// Wait before the second attempt
    pub initial_backoff: Duration,
    /// Cap for any single wait
    pub max_backoff: Duration,
    /// Randomize waits to 50-100% of the computed value
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            operation_timeout: Duration::from_secs(5),
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy derived from the database timeout and retry settings
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            operation_timeout: Duration::from_millis(config.operation_timeout_ms),
            initial_backoff: Duration::from_millis(config.retry_backoff_ms),
            ..Default::default()
        }
    }

    /// Single attempt, no waiting. Used where retries would only slow tests down.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            jitter: false,
            ..Default::default()
        }
    }

    /// Run `operation`, retrying transient failures
    pub async fn run<F, Fut, T>(&self, name: &'static str, operation: F) -> DomainResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        let mut attempt = 0u32;

        loop {
            let outcome = match tokio::time::timeout(self.operation_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(DomainError::unavailable(format!(
                    "{} timed out after {}ms",
                    name,
                    self.operation_timeout.as_millis()
                ))),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt + 1 < self.max_attempts => {
                    let backoff = self.calculate_backoff(attempt);
                    debug!(
                        operation = name,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Retrying after transient store error"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_retryable() {
                        warn!(
                            operation = name,
                            attempts = attempt + 1,
                            error = %err,
                            "Store still unavailable, giving up"
                        );
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Backoff before attempt number `attempt + 1`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let base = self.initial_backoff.saturating_mul(factor).min(self.max_backoff);

        if self.jitter && !base.is_zero() {
            base.mul_f64(rand::thread_rng().gen_range(0.5..1.0))
        } else {
            base
        }
    }
}
