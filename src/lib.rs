//! Blog-Audit: sitemap-driven SEO auditing of blog posts
//!
//! This crate discovers the posts listed in a website's sitemap, fetches and extracts
//! the readable content of each one, asks an external text-analysis service for an
//! SEO review, and assembles the results into a tabular report.

pub mod analysis;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Blog-Audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not fetch sitemap: {0}")]
    Fetch(#[from] pipeline::FetchError),

    #[error("No post URLs found in sitemap {url}")]
    EmptySitemap { url: String },

    #[error("None of the {candidates} post candidates could be analyzed")]
    NoResults { candidates: usize },

    #[error("Analysis error: {0}")]
    Analysis(#[from] analysis::AnalysisError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// HTTP-style classification of a run-fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadInput,
    NotFound,
    UpstreamTimeout,
    Internal,
}

impl ErrorClass {
    /// The HTTP status code a service wrapper should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadInput => 400,
            Self::NotFound => 404,
            Self::UpstreamTimeout => 504,
            Self::Internal => 500,
        }
    }
}

impl AuditError {
    /// Classifies this error for callers that speak HTTP
    pub fn class(&self) -> ErrorClass {
        use pipeline::FetchCause;

        match self {
            Self::Config(_) | Self::InvalidInput(_) => ErrorClass::BadInput,
            Self::EmptySitemap { .. } => ErrorClass::NotFound,
            Self::Fetch(err) => match &err.cause {
                FetchCause::Status { code: 404 | 410, .. } => ErrorClass::NotFound,
                FetchCause::Status { .. } => ErrorClass::BadInput,
                FetchCause::Timeout => ErrorClass::UpstreamTimeout,
                FetchCause::Transport(_) => ErrorClass::Internal,
            },
            Self::NoResults { .. } | Self::Analysis(_) | Self::Output(_) | Self::Reqwest(_) => {
                ErrorClass::Internal
            }
        }
    }

    /// Shorthand for `self.class().status_code()`
    pub fn status_code(&self) -> u16 {
        self.class().status_code()
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing API credential: environment variable {0} is not set")]
    MissingCredential(String),
}

/// URL normalization errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("URL is empty after removing whitespace")]
    Empty,

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("Malformed URL {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// Result type alias for Blog-Audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use analysis::{AnalysisClient, DeepSeekClient, SeoAnalysis};
pub use config::{ApiCredentials, Config};
pub use pipeline::{analyze_sitemap, AuditContext, Pipeline, RunOutcome, RunStatus};
pub use state::{CandidateState, RunState};
pub use url::{normalize, PostCandidate};
