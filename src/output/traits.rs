//! Export sink trait and associated types

use crate::output::report::Report;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while exporting a report
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Run-level facts written alongside the rows
#[derive(Debug, Clone)]
pub struct ReportMeta {
    /// The sitemap the run started from
    pub sitemap_url: String,

    /// When the report was produced
    pub generated_at: DateTime<Utc>,

    /// SHA-256 of the configuration file, when one was used
    pub config_hash: Option<String>,
}

impl ReportMeta {
    pub fn new(sitemap_url: impl Into<String>, config_hash: Option<String>) -> Self {
        Self {
            sitemap_url: sitemap_url.into(),
            generated_at: Utc::now(),
            config_hash,
        }
    }
}

/// Persists a report as a tabular artifact
///
/// Implementations must write columns in `report.columns` order and rows in
/// `report.rows` order.
pub trait ReportSink: Send + Sync {
    /// Writes the report and returns where it ended up
    fn export(&self, report: &Report, meta: &ReportMeta) -> OutputResult<PathBuf>;
}
