//! Retries for one-shot adapter calls.
//!
//! Only failures that [`AdapterError::is_retryable`] reports as transient are
//! retried. Long-running operations are not retried here; see [`crate::poll`].

use adcampaign_core::{AdapterError, AdapterResult};
use std::future::Future;
use std::time::Duration;

/// How many times to call a service and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total calls, counting the first one. `1` disables retries.
    pub max_attempts: u32,
    /// Wait after the first failure. Doubles with each further failure.
    pub base_delay: Duration,
    /// Upper bound on any wait. A rate-limited call always waits this long.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A single call with no retries.
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay.max(base_delay);
        self
    }

    /// Wait before the next call after `failures` consecutive failures, the
    /// last of which was `error`.
    pub fn delay_after(&self, failures: u32, error: &AdapterError) -> Duration {
        if matches!(error, AdapterError::RateLimited) {
            return self.max_delay;
        }
        let factor = 2u32.saturating_pow(failures.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Calls `call` until it succeeds, fails permanently, or `policy` runs out of
/// attempts. The last error is returned unchanged.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, service: &str, mut call: F) -> AdapterResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AdapterResult<T>>,
{
    let mut failures = 0;
    loop {
        let error = match call().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        failures += 1;
        if !error.is_retryable() || failures >= policy.max_attempts {
            return Err(error);
        }

        let delay = policy.delay_after(failures, &error);
        tracing::warn!(
            service,
            failures,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "transient adapter failure; retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
