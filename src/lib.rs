//! Trend Exporter
//!
//! Fetches daily balance histories and trend reports from a rate-limited
//! remote provider and renders them as CSV. The pipeline probes each
//! account's monthly history to resolve its report kind and date span,
//! splits the span into bounded windows, fetches the windows through a
//! shared rate limiter with per-request retry, and merges paired
//! asset/debt series before encoding.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod orchestrator;
pub mod progress;
pub mod provider;
pub mod windows;

pub use error::{ExportError, ExportResult};
pub use model::{Account, AccountKind, BalanceEntry, ReportKind, TrendType};
