//! Rate-limited fetch executor
//!
//! Runs a batch of independent asynchronous fetch operations under a shared
//! rate limiter, each wrapped in the retry policy. Tasks settle in whatever
//! order they finish; results come back in submission order, with each
//! task's failure isolated to its own slot.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::provider::{ProviderError, ProviderResult};

use super::rate_limiter::RequestRateLimiter;
use super::retry::RetryPolicy;

/// Invoked exactly once per task as it settles (success or permanent
/// failure), with the running count of finished tasks and the total.
pub type UnitCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Executor for one batch of rate-limited fetches.
#[derive(Clone)]
pub struct FetchExecutor {
    limiter: Arc<RequestRateLimiter>,
    retry: RetryPolicy,
}

impl FetchExecutor {
    pub fn new(limiter: Arc<RequestRateLimiter>, retry: RetryPolicy) -> Self {
        Self { limiter, retry }
    }

    /// Run one request through the limiter and retry policy.
    pub async fn run_one<T, F, Fut>(&self, operation: F) -> ProviderResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let limiter = self.limiter.clone();
        self.retry
            .run(|| {
                let limiter = limiter.clone();
                let attempt = operation();
                async move {
                    limiter.acquire().await;
                    attempt.await
                }
            })
            .await
    }

    /// Execute all tasks under the shared rate limit.
    ///
    /// Every task is retried independently; a task that still fails after
    /// exhausting its attempts occupies its `Err` slot without affecting
    /// siblings. Each acquired rate-limit slot covers one request, so
    /// retried attempts are paced like first attempts.
    pub async fn run_all<T, F, Fut>(
        &self,
        tasks: Vec<F>,
        on_unit_complete: Option<UnitCallback>,
    ) -> Vec<ProviderResult<T>>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult<T>> + Send + 'static,
    {
        let total = tasks.len();
        let finished = Arc::new(Mutex::new(0usize));
        let mut handles = Vec::with_capacity(total);

        for task in tasks {
            let limiter = self.limiter.clone();
            let retry = self.retry;
            let finished = finished.clone();
            let callback = on_unit_complete.clone();

            handles.push(tokio::spawn(async move {
                let result = retry
                    .run(|| {
                        let limiter = limiter.clone();
                        let attempt = task();
                        async move {
                            limiter.acquire().await;
                            attempt.await
                        }
                    })
                    .await;

                // The increment and the callback happen under one lock so
                // observers always see the counts in ascending order, even
                // when tasks settle on different worker threads.
                {
                    let mut finished = finished.lock();
                    *finished += 1;
                    if let Some(cb) = &callback {
                        cb(*finished, total);
                    }
                }
                result
            }));
        }

        let mut results = Vec::with_capacity(total);
        for handle in handles {
            results.push(handle.await.unwrap_or_else(|e| {
                Err(ProviderError::Internal(format!("fetch task panicked: {e}")))
            }));
        }
        results
    }
}
