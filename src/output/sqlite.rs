//! SQLite report sink
//!
//! Each export appends one row to `runs` and one row per post to `posts`. The
//! `posts` columns follow the report column order.

use crate::output::report::{Report, DATE_FORMAT};
use crate::output::traits::{OutputResult, ReportMeta, ReportSink};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQL schema for the report database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sitemap_url TEXT NOT NULL,
    generated_at TEXT NOT NULL,
    config_hash TEXT,
    analyzed_count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    slug TEXT NOT NULL,
    current_meta_description TEXT NOT NULL,
    suggested_meta_description TEXT NOT NULL,
    seo_summary TEXT NOT NULL,
    keywords TEXT NOT NULL,
    word_count INTEGER NOT NULL,
    date_analyzed TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_run ON posts(run_id);
"#;

/// Writes reports into a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(conn: &mut Connection, report: &Report, meta: &ReportMeta) -> OutputResult<i64> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO runs (sitemap_url, generated_at, config_hash, analyzed_count)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                meta.sitemap_url,
                meta.generated_at.format(DATE_FORMAT).to_string(),
                meta.config_hash,
                report.len() as i64
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO posts (run_id, title, url, slug, current_meta_description,
                    suggested_meta_description, seo_summary, keywords, word_count, date_analyzed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for row in &report.rows {
                let [title, url, slug, current, suggested, summary, keywords, _, date] =
                    row.cells();
                let word_count = row.word_count() as i64;
                stmt.execute(params![
                    run_id, title, url, slug, current, suggested, summary, keywords, word_count,
                    date
                ])?;
            }
        }

        tx.commit()?;
        Ok(run_id)
    }
}

impl ReportSink for SqliteSink {
    fn export(&self, report: &Report, meta: &ReportMeta) -> OutputResult<PathBuf> {
        let mut conn = Connection::open(&self.path)?;
        let run_id = Self::write(&mut conn, report, meta)?;

        tracing::info!(
            path = %self.path.display(),
            run_id,
            rows = report.len(),
            "Wrote SQLite report"
        );
        Ok(self.path.clone())
    }
}
