//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the pipeline:
//! - Building the HTTP client with timeouts, redirect policy and user agent
//! - GET requests with a bounded number of attempts
//! - Classification of failures into status / timeout / transport causes

use crate::config::FetcherConfig;
use crate::url::normalize;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Longest slice of an error response body kept in a [`FetchCause::Status`]
const MAX_ERROR_BODY_CHARS: usize = 512;

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code of the final response
    pub status_code: u16,
    /// Final URL after redirects
    pub final_url: String,
    /// Response body
    pub body: String,
}

/// Why an attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    /// The server answered with a non-2xx status
    Status { code: u16, body: String },
    /// The request did not complete within the configured timeout
    Timeout,
    /// Connection, TLS, redirect or body-decoding failure
    Transport(String),
}

impl FetchCause {
    /// Short tag used in logs
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
        }
    }

    /// The HTTP status code, when the failure was a status failure
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl fmt::Display for FetchCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { code, .. } => write!(f, "HTTP {}", code),
            Self::Timeout => write!(f, "request timed out"),
            Self::Transport(message) => write!(f, "transport error: {}", message),
        }
    }
}

/// Failure of a whole fetch call; carries the cause of the final attempt
#[derive(Debug, Clone, Error)]
#[error("fetching {url} failed after {attempts} attempt(s): {cause}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    pub cause: FetchCause,
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed transparently up to `max_redirects` hops.
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches URLs with bounded retries
///
/// Failures are scoped to one `fetch` call; nothing is remembered across URLs.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Attempts made per call by [`Fetcher::fetch`]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetches `url` using the configured number of attempts
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.fetch_with_attempts(url, self.max_attempts).await
    }

    /// Fetches `url`, trying up to `max_attempts` times
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return the body |
    /// | Non-2xx status | Retry after the pause |
    /// | Timeout | Retry after the pause |
    /// | Connection / TLS / redirect error | Retry after the pause |
    /// | Attempts exhausted | Fail with the last attempt's cause |
    pub async fn fetch_with_attempts(
        &self,
        url: &str,
        max_attempts: u32,
    ) -> Result<FetchedPage, FetchError> {
        let target = match normalize(url) {
            Ok(target) => target,
            Err(e) => {
                return Err(FetchError {
                    url: url.to_string(),
                    attempts: 0,
                    cause: FetchCause::Transport(e.to_string()),
                })
            }
        };

        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;

        let outcome = loop {
            attempt += 1;
            tracing::debug!(url = %target, attempt, max_attempts, "Fetching");

            match self.attempt(&target).await {
                Ok(page) => break Ok(page),
                Err(cause) if attempt < max_attempts => {
                    tracing::warn!(
                        url = %target,
                        attempt,
                        cause = cause.tag(),
                        "Attempt failed, retrying: {}",
                        cause
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(cause) => {
                    break Err(FetchError {
                        url: target.clone(),
                        attempts: attempt,
                        cause,
                    })
                }
            }
        };

        if let Err(e) = &outcome {
            tracing::warn!(url = %e.url, cause = e.cause.tag(), "Giving up: {}", e);
        }

        outcome
    }

    async fn attempt(&self, url: &str) -> Result<FetchedPage, FetchCause> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchCause::from_reqwest(&e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchCause::from_reqwest(&e))?;

        if !status.is_success() {
            return Err(FetchCause::Status {
                code: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(FetchedPage {
            status_code: status.as_u16(),
            final_url,
            body,
        })
    }
}
