//! Error handling for the export pipeline.
//!
//! Two layers of failure exist:
//! - Structural errors ([`ExportError`]) abort the whole invocation and are
//!   raised synchronously: unsupported report kind, unresolvable kind probe,
//!   missing history where a start date is required, bad configuration.
//! - Transient fetch failures stay inside the retry/isolation layers as
//!   [`crate::provider::ProviderError`] and never escape as `ExportError`
//!   unless every sibling path has already been exhausted.

mod traits;

pub use traits::{ErrorCategory, ErrorClassification};

use thiserror::Error;

use crate::provider::ProviderError;

/// Top-level errors for one export invocation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExportError {
    /// Monthly history probe returned no entries; no start date can be
    /// derived. Isolated per account by the orchestrator.
    #[error("no balance history available to determine a start date")]
    NoHistory,

    /// Neither or both of the ASSETS/DEBTS probes returned data for an
    /// account. Treated as structural rather than guessed.
    #[error("could not resolve report kind for account '{account}': {reason}")]
    ReportKindUnresolved { account: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    /// CSV serialization failed while writing the output table.
    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ErrorClassification for ExportError {
    fn category(&self) -> ErrorCategory {
        match self {
            ExportError::NoHistory => ErrorCategory::Permanent,
            ExportError::ReportKindUnresolved { .. } => ErrorCategory::Permanent,
            ExportError::Configuration(_) => ErrorCategory::Configuration,
            ExportError::Encode(_) => ErrorCategory::Internal,
            ExportError::Provider(e) => e.category(),
        }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
