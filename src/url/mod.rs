//! URL handling module for Blog-Audit
//!
//! This module provides raw-URL cleanup, the validated [`PostCandidate`] type, and
//! slug derivation for post URLs.

mod normalize;

use crate::NormalizeError;
use std::fmt;
use url::Url;

pub use normalize::normalize;

/// A normalized, absolute http(s) URL believed to reference a post page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostCandidate(String);

impl PostCandidate {
    /// Normalizes `raw` and checks that the result is a well-formed absolute URL
    ///
    /// # Examples
    ///
    /// ```
    /// use blog_audit::url::PostCandidate;
    ///
    /// let candidate = PostCandidate::parse(" https://example.com/post/hello\n").unwrap();
    /// assert_eq!(candidate.as_str(), "https://example.com/post/hello");
    /// assert!(PostCandidate::parse("/post/relative").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, NormalizeError> {
        let normalized = normalize(raw)?;
        let parsed = Url::parse(&normalized).map_err(|e| NormalizeError::Malformed {
            url: normalized.clone(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(NormalizeError::InvalidScheme(parsed.scheme().to_string()));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(NormalizeError::MissingHost(normalized));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path segment following `marker`, or an empty string
    pub fn slug(&self, marker: &str) -> String {
        slug_from_url(&self.0, marker)
    }
}

impl fmt::Display for PostCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostCandidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts the path segment that follows the post marker
///
/// Returns an empty string when the marker is absent or nothing follows it.
///
/// # Examples
///
/// ```
/// use blog_audit::url::slug_from_url;
///
/// assert_eq!(slug_from_url("https://example.com/post/my-first-post/", "/post/"), "my-first-post");
/// assert_eq!(slug_from_url("https://example.com/about", "/post/"), "");
/// ```
pub fn slug_from_url(url: &str, marker: &str) -> String {
    let Some(idx) = url.find(marker) else {
        return String::new();
    };

    url[idx + marker.len()..]
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Returns true when `url` is an absolute http or https URL
pub fn is_http_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| (u.scheme() == "http" || u.scheme() == "https") && u.host_str().is_some())
        .unwrap_or(false)
}
