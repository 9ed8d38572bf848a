//! Provider trait definitions
//!
//! The trend provider abstracts the remote balance API: a paginated account
//! listing and a windowed trend query. Authentication, base URL, and wire
//! format are implementation details of each provider.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{ErrorCategory, ErrorClassification};
use crate::model::{Account, BalanceEntry, ReportKind, TrendFilter};
use crate::windows::Window;

/// Provider error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The provider returned an empty payload where trend data was
    /// expected. Upstream this means the request timed out.
    #[error("Trend timeout")]
    TrendTimeout,

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ErrorClassification for ProviderError {
    fn category(&self) -> ErrorCategory {
        match self {
            ProviderError::Connection(_) => ErrorCategory::Transient,
            ProviderError::Request(_) => ErrorCategory::Transient,
            ProviderError::Parse(_) => ErrorCategory::Permanent,
            ProviderError::RateLimited(_) => ErrorCategory::ResourceExhausted,
            ProviderError::TrendTimeout => ErrorCategory::Transient,
            ProviderError::Authentication(_) => ErrorCategory::Configuration,
            ProviderError::Configuration(_) => ErrorCategory::Configuration,
            ProviderError::Internal(_) => ErrorCategory::Internal,
        }
    }

    fn suggested_retry_delay(&self) -> Option<std::time::Duration> {
        match self {
            ProviderError::Connection(_) => Some(std::time::Duration::from_secs(1)),
            ProviderError::Request(_) => Some(std::time::Duration::from_millis(500)),
            ProviderError::TrendTimeout => Some(std::time::Duration::from_millis(500)),
            ProviderError::RateLimited(_) => Some(std::time::Duration::from_secs(5)),
            _ => None,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Remote balance/trend API.
///
/// `fetch_trends` returns `Ok(None)` when the report kind does not apply to
/// the given filter (the kind probe relies on exactly that distinction) or
/// when the request timed out upstream. In the daily-fetch path callers map
/// `None` to [`ProviderError::TrendTimeout`] so the retry layer sees it as a
/// transient failure.
#[async_trait]
pub trait TrendProvider: Send + Sync {
    /// Paginated account listing. One page at the default limit is assumed
    /// to hold every account.
    async fn fetch_accounts(&self, offset: usize, limit: usize) -> ProviderResult<Vec<Account>>;

    /// Fetch trend entries of one report kind for one date window.
    async fn fetch_trends(
        &self,
        report_kind: ReportKind,
        filter: &TrendFilter,
        window: &Window,
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Option<Vec<BalanceEntry>>>;
}
