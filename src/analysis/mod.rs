//! SEO analysis of extracted post content
//!
//! The pipeline depends only on the [`AnalysisClient`] trait. [`DeepSeekClient`] is
//! the production implementation talking to an OpenAI-compatible chat API; tests
//! substitute their own implementations.

mod client;
mod response;

pub use client::DeepSeekClient;
pub use response::{parse_analysis, strip_code_fence, truncate_body, TRUNCATION_MARKER};

use async_trait::async_trait;
use thiserror::Error;

/// Structured SEO review of one post
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoAnalysis {
    pub suggested_meta_description: String,
    pub seo_summary: String,
    /// Keyword phrases, most relevant first
    pub keywords: Vec<String>,
}

/// Errors returned by an analysis collaborator
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Authentication with the analysis service failed (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Analysis service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not parse analysis response: {0}")]
    Parse(String),

    #[error("Analysis service returned no content")]
    EmptyResponse,
}

/// Contract for the external text-analysis service
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Produces an SEO analysis for a post's title and body text
    async fn analyze(&self, title: &str, body_text: &str) -> Result<SeoAnalysis, AnalysisError>;
}
