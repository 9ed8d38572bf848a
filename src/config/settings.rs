//! Application settings and configuration

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Remote API configuration
    pub api: ApiSettings,
    /// Fetch/windowing configuration
    #[serde(default)]
    pub fetch: FetchSettings,
    /// Rate limit configuration
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL for all requests
    pub base_url: String,
    /// Bearer token attached to every request. Typically supplied via the
    /// TREND_EXPORTER__API__TOKEN environment variable.
    #[serde(default)]
    pub token: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Window and retry settings for the fetch pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Maximum calendar days one window may cover
    #[serde(default = "default_max_window_days")]
    pub max_window_days: u32,
    /// Page size for paginated endpoints
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
    /// Total attempts per request, including the first
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Initial retry backoff in milliseconds; doubles per attempt
    #[serde(default = "default_retry_initial_backoff_ms")]
    pub retry_initial_backoff_ms: u64,
}

impl FetchSettings {
    pub fn retry_initial_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_initial_backoff_ms)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_window_days: default_max_window_days(),
            page_limit: default_page_limit(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_initial_backoff_ms: default_retry_initial_backoff_ms(),
        }
    }
}

/// Request rate limit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Maximum requests per minute across the whole run. 0 disables the
    /// limiter.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_window_days() -> u32 {
    90
}

fn default_page_limit() -> usize {
    1000
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_initial_backoff_ms() -> u64 {
    500
}

fn default_requests_per_minute() -> u32 {
    100
}

impl Settings {
    /// Load settings from an optional file plus environment overrides.
    ///
    /// Environment variables use the `TREND_EXPORTER__` prefix with `__` as
    /// the section separator, e.g. `TREND_EXPORTER__API__TOKEN`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("trend-exporter").required(false)),
        };

        builder
            .add_source(Environment::with_prefix("TREND_EXPORTER").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_defaults() {
        let fetch = FetchSettings::default();
        assert_eq!(fetch.max_window_days, 90);
        assert_eq!(fetch.page_limit, 1000);
        assert_eq!(fetch.retry_max_attempts, 3);
        assert_eq!(fetch.retry_initial_backoff(), Duration::from_millis(500));
    }

    #[test]
    fn test_rate_limit_defaults() {
        assert_eq!(RateLimitSettings::default().requests_per_minute, 100);
    }
}
