//! Storage abstractions for boundary document persistence.
//!
//! Fetched documents land in a directory tree keyed by division code,
//! with run artifacts at the root:
//!
//! ```text
//! data/
//! ├── 420000/
//! │   ├── geo.json              # Province boundary
//! │   ├── 420100/
//! │   │   └── geo.json          # City boundary
//! │   └── 420200/
//! │       └── geo.json
//! ├── crawl_summary.json        # Run statistics
//! └── error_log.json            # Failed nodes (only when failures occurred)
//! ```

pub mod local;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{CrawlSummary, ErrorRecord};

// Re-export for convenience
pub use local::LocalStore;

/// File name for a stored boundary document.
pub const GEO_DOCUMENT: &str = "geo.json";

/// File name for the run summary artifact.
pub const SUMMARY_FILE: &str = "crawl_summary.json";

/// File name for the error log artifact.
pub const ERROR_LOG_FILE: &str = "error_log.json";

/// Trait for boundary document storage backends.
#[async_trait]
pub trait BoundaryStore: Send + Sync {
    /// Persist a province boundary document under its code.
    async fn put_province(&self, province_code: &str, document: &Value) -> Result<()>;

    /// Persist a city boundary document under its parent province.
    async fn put_city(&self, province_code: &str, city_code: &str, document: &Value)
        -> Result<()>;

    /// Write the run summary artifact.
    async fn write_summary(&self, summary: &CrawlSummary) -> Result<()>;

    /// Write the error log artifact.
    async fn write_error_log(&self, errors: &[ErrorRecord]) -> Result<()>;

    /// Load a previously written summary, if one exists.
    async fn load_summary(&self) -> Result<Option<CrawlSummary>>;
}
