//! Data provider abstraction
//!
//! A provider exposes the remote balance API behind the [`TrendProvider`]
//! trait: account listing plus windowed trend queries. The HTTP
//! implementation talks to the real service; the mock is scriptable for
//! tests and offline development.

mod http;
mod mock;
mod traits;

pub use http::HttpTrendProvider;
pub use mock::MockTrendProvider;
pub use traits::{ProviderError, ProviderResult, TrendProvider};
