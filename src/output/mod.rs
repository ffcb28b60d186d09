//! Output module for building and exporting analysis reports
//!
//! This module handles:
//! - Assembling analyzed records into rows under the fixed column schema
//! - Exporting the rows through a [`ReportSink`] (markdown or SQLite)

mod markdown;
mod report;
mod sqlite;
mod traits;

pub use markdown::{format_markdown_report, MarkdownSink};
pub use report::{build_report, AnalyzedRecord, Report, ReportRow, DATE_FORMAT, REPORT_COLUMNS};
pub use sqlite::SqliteSink;
pub use traits::{OutputError, OutputResult, ReportMeta, ReportSink};

use crate::config::{OutputConfig, OutputFormat};

/// Creates the sink selected by the output configuration
pub fn create_sink(config: &OutputConfig) -> Box<dyn ReportSink> {
    match config.format {
        OutputFormat::Markdown => Box::new(MarkdownSink::new(&config.path)),
        OutputFormat::Sqlite => Box::new(SqliteSink::new(&config.path)),
    }
}
