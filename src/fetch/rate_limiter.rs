//! Token-bucket rate limiting for API requests.
//!
//! One limiter instance is shared by every request of one orchestration run
//! and injected into the executor, so independent runs (and tests) get
//! independent limiters. Uses the `governor` crate.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use tracing::debug;

use crate::config::RateLimitSettings;

type Limiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Global request rate limiter for one export run.
///
/// Caps requests per unit time, not merely concurrency: however many windows
/// or accounts are queued, the externally observed request rate never
/// exceeds the configured cap.
pub struct RequestRateLimiter {
    limiter: Option<Arc<Limiter>>,
    requests_per_minute: u32,
}

impl RequestRateLimiter {
    /// Create a limiter from configuration. A cap of 0 disables limiting.
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        let limiter = NonZeroU32::new(settings.requests_per_minute).map(|rate| {
            let quota = Quota::per_minute(rate);
            Arc::new(GovernorRateLimiter::direct(quota))
        });

        Self {
            limiter,
            requests_per_minute: settings.requests_per_minute,
        }
    }

    /// Wait until the next request is allowed.
    pub async fn acquire(&self) {
        if let Some(ref limiter) = self.limiter {
            debug!(
                "Acquiring request slot ({}/min cap)",
                self.requests_per_minute
            );
            limiter.until_ready().await;
        }
    }

    /// Whether rate limiting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }
}

impl Default for RequestRateLimiter {
    fn default() -> Self {
        Self::from_settings(&RateLimitSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_from_settings() {
        let limiter = RequestRateLimiter::from_settings(&RateLimitSettings {
            requests_per_minute: 120,
        });
        assert!(limiter.is_enabled());
    }

    #[test]
    fn test_zero_cap_disables_limiter() {
        let limiter = RequestRateLimiter::from_settings(&RateLimitSettings {
            requests_per_minute: 0,
        });
        assert!(!limiter.is_enabled());
    }

    #[tokio::test]
    async fn test_acquire_with_high_cap_completes() {
        let limiter = RequestRateLimiter::from_settings(&RateLimitSettings {
            requests_per_minute: 6000,
        });
        limiter.acquire().await;
        limiter.acquire().await;
    }

    #[tokio::test]
    async fn test_acquire_with_disabled_limiter_is_noop() {
        let limiter = RequestRateLimiter::from_settings(&RateLimitSettings {
            requests_per_minute: 0,
        });
        limiter.acquire().await;
    }
}
