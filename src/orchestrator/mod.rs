//! Export orchestration.
//!
//! Two orchestrators share the fetch executor: [`HistoryExporter`] walks
//! every account sequentially and stitches per-account daily histories,
//! [`TrendExporter`] runs a single report kind over an explicit date range.

mod history;
mod trend;

pub use history::{AccountHistory, HistoryExporter};
pub use trend::TrendExporter;
