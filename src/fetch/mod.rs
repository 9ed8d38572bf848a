//! Rate-limited fetch infrastructure
//!
//! Composition of three pieces:
//! - [`RequestRateLimiter`]: token-bucket pacing shared across one run
//! - [`RetryPolicy`]: per-operation retry of transient failures
//! - [`FetchExecutor`]: runs a batch of independent fetches, reporting
//!   per-unit completion and preserving submission order

mod executor;
mod rate_limiter;
mod retry;

pub use executor::{FetchExecutor, UnitCallback};
pub use rate_limiter::RequestRateLimiter;
pub use retry::RetryPolicy;
