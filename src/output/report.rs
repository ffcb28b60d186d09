//! Report assembly
//!
//! Turns analyzed records into rows under the fixed report schema. Formatting of the
//! final artifact belongs to the [`ReportSink`](crate::output::ReportSink) implementations.

use chrono::{DateTime, Utc};

/// Column headers, in the order every sink must write them
pub const REPORT_COLUMNS: [&str; 9] = [
    "Title",
    "URL",
    "Slug",
    "Current Meta Description",
    "Suggested Meta Description",
    "SEO Summary",
    "Keywords",
    "Word Count",
    "Date Analyzed",
];

/// Timestamp format of the "Date Analyzed" column
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One successfully analyzed post
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedRecord {
    pub title: String,
    pub url: String,
    pub slug: String,
    pub current_meta_description: String,
    pub suggested_meta_description: String,
    pub seo_summary: String,
    /// Comma-joined keywords, most relevant first
    pub keywords: String,
    pub word_count: usize,
    /// When the analysis finished
    pub analyzed_at: DateTime<Utc>,
}

/// A report row; cells follow [`REPORT_COLUMNS`]
///
/// Typed sinks read the numeric word count directly instead of re-parsing its cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    cells: [String; 9],
    word_count: usize,
}

impl ReportRow {
    pub fn cells(&self) -> &[String; 9] {
        &self.cells
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

impl From<&AnalyzedRecord> for ReportRow {
    fn from(record: &AnalyzedRecord) -> Self {
        Self {
            cells: [
                record.title.clone(),
                record.url.clone(),
                record.slug.clone(),
                record.current_meta_description.clone(),
                record.suggested_meta_description.clone(),
                record.seo_summary.clone(),
                record.keywords.clone(),
                record.word_count.to_string(),
                record.analyzed_at.format(DATE_FORMAT).to_string(),
            ],
            word_count: record.word_count,
        }
    }
}

/// Ordered rows ready for an export sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub columns: [&'static str; 9],
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds the report, keeping record order
pub fn build_report(records: &[AnalyzedRecord]) -> Report {
    Report {
        columns: REPORT_COLUMNS,
        rows: records.iter().map(ReportRow::from).collect(),
    }
}
