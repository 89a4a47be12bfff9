//! Bounded retry with exponential back-off for backend lookups.

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::LookupError;

pub const DEFAULT_RETRIES: usize = 2;
pub const DEFAULT_RETRY_BASE_MS: u64 = 50;

/// How many times to retry a retryable [`LookupError`], and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: usize,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: DEFAULT_RETRIES, base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_MS) }
    }
}

impl RetryPolicy {
    /// Single attempt, no back-off.
    #[must_use]
    pub fn none() -> Self {
        Self { retries: 0, base_delay: Duration::ZERO }
    }

    #[must_use]
    pub fn delay_for(&self, retry: usize) -> Duration {
        let shift = u32::try_from(retry).unwrap_or(u32::MAX).min(16);
        self.base_delay.saturating_mul(1 << shift)
    }

    /// Run `op`, retrying retryable failures up to `self.retries` times.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-retryable error immediately.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, LookupError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LookupError>>,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.retryable() && retry < self.retries => {
                    let delay = self.delay_for(retry);
                    warn!(error = %e, lookup = label, attempt = retry + 1, total = self.retries + 1, "lookup failed; retrying");
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
