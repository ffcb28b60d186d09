//! Pipeline coordinator - main per-candidate orchestration logic
//!
//! This module contains the loop that drives every post candidate through
//! fetch → extract → analyze → record, including:
//! - Strictly sequential processing in sitemap order
//! - The consecutive-error budget
//! - Pacing between candidates
//! - Handing the accumulated records to a report sink

use crate::analysis::AnalysisClient;
use crate::config::PipelineConfig;
use crate::output::{build_report, AnalyzedRecord, ReportMeta, ReportSink};
use crate::pipeline::extractor::extract;
use crate::pipeline::fetcher::Fetcher;
use crate::pipeline::sitemap::SitemapResolver;
use crate::state::{CandidateState, RunState};
use crate::url::{is_http_url, PostCandidate};
use crate::AuditError;
use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every candidate was processed
    Completed,
    /// The error budget ran out before the last candidate
    StoppedEarly,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::StoppedEarly => "stopped_early",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the "analyze sitemap" operation
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub analyzed_count: usize,
    pub candidate_count: usize,
    pub report_path: PathBuf,
}

/// Records and counters accumulated by one pass over the candidates
#[derive(Debug, Clone)]
pub struct RunReport {
    pub records: Vec<AnalyzedRecord>,
    pub state: RunState,
    pub status: RunStatus,
}

#[derive(Debug)]
enum CandidateOutcome {
    Recorded(AnalyzedRecord),
    Skipped,
    Failed,
}

impl CandidateOutcome {
    fn state(&self) -> CandidateState {
        match self {
            Self::Recorded(_) => CandidateState::Recorded,
            Self::Skipped => CandidateState::Skipped,
            Self::Failed => CandidateState::Failed,
        }
    }
}

/// Main pipeline structure
pub struct Pipeline {
    fetcher: Fetcher,
    analyzer: Box<dyn AnalysisClient>,
    settings: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline from its collaborators
    pub fn new(
        fetcher: Fetcher,
        analyzer: Box<dyn AnalysisClient>,
        settings: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            analyzer,
            settings,
        }
    }

    /// Validates the sitemap URL and resolves its post candidates
    pub async fn resolve(&self, sitemap_url: &str) -> Result<Vec<PostCandidate>, AuditError> {
        if !is_http_url(sitemap_url) {
            return Err(AuditError::InvalidInput(format!(
                "sitemap URL must be an absolute http(s) URL, got '{}'",
                sitemap_url
            )));
        }

        SitemapResolver::new(&self.fetcher, &self.settings.post_marker)
            .resolve(sitemap_url)
            .await
    }

    /// Resolves the sitemap and processes every candidate
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - At least one record was produced
    /// * `Err(AuditError)` - Bad input, sitemap failure, or zero records
    pub async fn run(&self, sitemap_url: &str) -> Result<RunReport, AuditError> {
        let candidates = self.resolve(sitemap_url).await?;
        let report = self.process_candidates(&candidates).await;

        if report.records.is_empty() {
            tracing::error!(
                url = sitemap_url,
                candidates = candidates.len(),
                "No candidate could be analyzed"
            );
            return Err(AuditError::NoResults {
                candidates: candidates.len(),
            });
        }

        Ok(report)
    }

    /// Runs the pipeline and exports the report through `sink`
    pub async fn analyze_sitemap(
        &self,
        sitemap_url: &str,
        sink: &dyn ReportSink,
        config_hash: Option<String>,
    ) -> Result<RunOutcome, AuditError> {
        let run = self.run(sitemap_url).await?;

        let report = build_report(&run.records);
        let report_path = sink.export(&report, &ReportMeta::new(sitemap_url, config_hash))?;

        Ok(RunOutcome {
            status: run.status,
            analyzed_count: run.state.analyzed,
            candidate_count: run.state.candidates,
            report_path,
        })
    }

    /// Processes candidates in order until they run out or the error budget is spent
    ///
    /// A fixed pause separates consecutive candidates whatever their outcome.
    pub async fn process_candidates(&self, candidates: &[PostCandidate]) -> RunReport {
        let mut state = RunState::new(candidates.len());
        let mut records = Vec::new();
        let mut status = RunStatus::Completed;
        let delay = Duration::from_millis(self.settings.request_delay_ms);

        for (index, candidate) in candidates.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::info!(
                "[{}/{}] Analyzing {}",
                index + 1,
                candidates.len(),
                candidate
            );

            let outcome = self.process_candidate(candidate).await;
            state.record_outcome(outcome.state());
            if let CandidateOutcome::Recorded(record) = outcome {
                records.push(record);
            }

            if state.budget_exhausted(self.settings.error_budget) {
                let remaining = candidates.len() - index - 1;
                if remaining > 0 {
                    tracing::warn!(
                        consecutive_errors = state.consecutive_errors,
                        remaining,
                        "Error budget exhausted, abandoning remaining candidates"
                    );
                    status = RunStatus::StoppedEarly;
                }
                break;
            }
        }

        tracing::info!(
            analyzed = state.analyzed,
            skipped = state.skipped,
            failed = state.failed,
            candidates = state.candidates,
            "Run finished: {}",
            status
        );

        RunReport {
            records,
            state,
            status,
        }
    }

    /// Drives one candidate through its lifecycle
    async fn process_candidate(&self, candidate: &PostCandidate) -> CandidateOutcome {
        let url = candidate.as_str();
        let mut state = CandidateState::Pending;

        advance(url, &mut state, CandidateState::Fetching);
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(url, stage = %state, cause = e.cause.tag(), "Fetch failed: {}", e);
                advance(url, &mut state, CandidateState::Failed);
                return CandidateOutcome::Failed;
            }
        };

        advance(url, &mut state, CandidateState::Extracting);
        let content = extract(&page.body);
        if content.is_empty() {
            tracing::warn!(
                url,
                stage = %state,
                final_url = %page.final_url,
                "No content extracted"
            );
            advance(url, &mut state, CandidateState::Skipped);
            return CandidateOutcome::Skipped;
        }

        advance(url, &mut state, CandidateState::Analyzing);
        let analysis = match self
            .analyzer
            .analyze(&content.title, &content.body_text)
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!(url, stage = %state, "Analysis failed: {}", e);
                advance(url, &mut state, CandidateState::Failed);
                return CandidateOutcome::Failed;
            }
        };

        advance(url, &mut state, CandidateState::Recorded);
        tracing::debug!(url, words = content.word_count, "Recorded analysis");

        CandidateOutcome::Recorded(AnalyzedRecord {
            title: content.title,
            url: url.to_string(),
            slug: candidate.slug(&self.settings.post_marker),
            current_meta_description: content.meta_description,
            suggested_meta_description: analysis.suggested_meta_description,
            seo_summary: analysis.seo_summary,
            keywords: analysis.keywords.join(", "),
            word_count: content.word_count,
            analyzed_at: Utc::now(),
        })
    }
}

fn advance(url: &str, current: &mut CandidateState, next: CandidateState) {
    debug_assert!(
        current.can_transition_to(next),
        "invalid candidate transition {} -> {}",
        current,
        next
    );
    tracing::trace!(url, from = %current, to = %next, "Candidate state change");
    *current = next;
}
