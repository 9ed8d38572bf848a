//! Configuration
//!
//! Settings are loaded from an optional TOML file plus environment
//! overrides, following the layered `config` crate pattern.

mod settings;

pub use settings::{ApiSettings, FetchSettings, RateLimitSettings, Settings};
