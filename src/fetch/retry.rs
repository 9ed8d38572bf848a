//! Retry policy for transient failures.
//!
//! A small decorator composed around each unit of work rather than
//! duplicated per call site. Only errors that classify themselves as
//! transient are retried; backoff doubles per attempt up to a cap, unless
//! the error suggests its own delay.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::FetchSettings;
use crate::error::ErrorClassification;

/// Backoff never grows past this.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Retry configuration applied to one asynchronous operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per subsequent retry.
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    pub fn from_settings(settings: &FetchSettings) -> Self {
        Self::new(
            settings.retry_max_attempts,
            settings.retry_initial_backoff(),
        )
    }

    /// Run `operation`, retrying transient failures until the attempt
    /// budget is exhausted. The final error is returned unchanged, so a
    /// retried success is indistinguishable from an immediate one.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        E: ErrorClassification + std::fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts = 0;
        let mut delay = self.initial_backoff;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempts += 1;

                    if !err.is_transient() || attempts >= self.max_attempts {
                        return Err(err);
                    }

                    let retry_delay = err.suggested_retry_delay().unwrap_or(delay);
                    warn!(
                        "Attempt {}/{} failed ({:?}), retrying in {:?}",
                        attempts, self.max_attempts, err, retry_delay
                    );
                    tokio::time::sleep(retry_delay).await;

                    delay = std::cmp::min(delay * 2, MAX_BACKOFF);
                }
            }
        }
    }
}
