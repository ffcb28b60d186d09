//! Pipeline module for turning a sitemap into analyzed post records
//!
//! This module contains the core audit logic, including:
//! - HTTP fetching with bounded retries
//! - Sitemap parsing and post candidate selection
//! - Readable content extraction from post HTML
//! - Sequential per-candidate coordination under an error budget

mod coordinator;
mod extractor;
mod fetcher;
mod sitemap;

pub use coordinator::{Pipeline, RunOutcome, RunReport, RunStatus};
pub use extractor::{collapse_whitespace, extract, ExtractedContent, NO_TITLE};
pub use fetcher::{build_http_client, FetchCause, FetchError, FetchedPage, Fetcher};
pub use sitemap::{extract_post_candidates, SitemapResolver, SITEMAP_NAMESPACE};

use crate::analysis::DeepSeekClient;
use crate::config::{ApiCredentials, Config};
use crate::output::create_sink;
use crate::AuditError;

/// Everything a run needs besides the sitemap URL
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub config: Config,
    /// Hash of the configuration file, when one was loaded
    pub config_hash: Option<String>,
    pub credentials: ApiCredentials,
}

impl AuditContext {
    pub fn new(config: Config, config_hash: Option<String>, credentials: ApiCredentials) -> Self {
        Self {
            config,
            config_hash,
            credentials,
        }
    }

    /// Reads the API credential from the environment variable named in `config`
    pub fn from_env(config: Config, config_hash: Option<String>) -> Result<Self, AuditError> {
        let credentials = ApiCredentials::from_env(&config.analysis)?;
        Ok(Self::new(config, config_hash, credentials))
    }
}

/// Runs a complete audit of one sitemap
///
/// This is the main entry point. It will:
/// 1. Build the HTTP fetcher and the analysis client
/// 2. Resolve post candidates from the sitemap
/// 3. Fetch, extract and analyze each candidate in order
/// 4. Export the report through the configured sink
///
/// # Arguments
///
/// * `ctx` - Configuration and credentials for the run
/// * `sitemap_url` - Absolute http(s) URL of the sitemap
///
/// # Returns
///
/// * `Ok(RunOutcome)` - At least one post was analyzed and the report was written
/// * `Err(AuditError)` - The run failed; see [`AuditError::class`]
pub async fn analyze_sitemap(
    ctx: &AuditContext,
    sitemap_url: &str,
) -> Result<RunOutcome, AuditError> {
    let fetcher = Fetcher::new(&ctx.config.fetcher)?;
    let analyzer = DeepSeekClient::new(&ctx.config.analysis, &ctx.credentials)?;
    let pipeline = Pipeline::new(fetcher, Box::new(analyzer), ctx.config.pipeline.clone());

    tracing::info!(
        url = sitemap_url,
        format = ?ctx.config.output.format,
        path = %ctx.config.output.path,
        "Starting sitemap audit"
    );

    let sink = create_sink(&ctx.config.output);
    pipeline
        .analyze_sitemap(sitemap_url, sink.as_ref(), ctx.config_hash.clone())
        .await
}
