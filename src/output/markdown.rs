//! Markdown report generation
//!
//! Writes the report as a single markdown pipe table preceded by a short run header.

use crate::output::report::{Report, DATE_FORMAT};
use crate::output::traits::{OutputResult, ReportMeta, ReportSink};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes reports as markdown files
#[derive(Debug, Clone)]
pub struct MarkdownSink {
    path: PathBuf,
}

impl MarkdownSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for MarkdownSink {
    fn export(&self, report: &Report, meta: &ReportMeta) -> OutputResult<PathBuf> {
        let markdown = format_markdown_report(report, meta);

        let mut file = File::create(&self.path)?;
        file.write_all(markdown.as_bytes())?;
        file.flush()?;

        tracing::info!(path = %self.path.display(), rows = report.len(), "Wrote markdown report");
        Ok(self.path.clone())
    }
}

/// Formats a report as markdown
pub fn format_markdown_report(report: &Report, meta: &ReportMeta) -> String {
    let mut md = String::new();

    md.push_str("# Blog SEO Analysis\n\n");
    md.push_str(&format!("- **Sitemap**: {}\n", meta.sitemap_url));
    md.push_str(&format!(
        "- **Generated**: {} UTC\n",
        meta.generated_at.format(DATE_FORMAT)
    ));
    if let Some(hash) = &meta.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push_str(&format!("- **Posts Analyzed**: {}\n\n", report.len()));

    md.push_str(&format!("| {} |\n", report.columns.join(" | ")));
    md.push_str(&format!(
        "|{}\n",
        report.columns.iter().map(|_| "---|").collect::<String>()
    ));

    for row in &report.rows {
        let cells: Vec<String> = row.cells().iter().map(|c| escape_cell(c)).collect();
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    md
}

/// Makes a value safe inside a pipe table cell
fn escape_cell(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}
