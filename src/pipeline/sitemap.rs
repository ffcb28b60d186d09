//! Sitemap resolution
//!
//! Turns a sitemap resource into the ordered, de-duplicated list of post URLs it
//! references. XML is tried first; bodies that are not XML are scanned as plain text.

use crate::pipeline::fetcher::Fetcher;
use crate::url::PostCandidate;
use crate::AuditError;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::collections::HashSet;
use thiserror::Error;

/// Namespace of the sitemaps.org protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Error)]
enum SitemapParseError {
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("document contains no XML elements")]
    NoElements,
}

/// Resolves sitemap URLs into post candidates
pub struct SitemapResolver<'a> {
    fetcher: &'a Fetcher,
    post_marker: &'a str,
}

impl<'a> SitemapResolver<'a> {
    pub fn new(fetcher: &'a Fetcher, post_marker: &'a str) -> Self {
        Self {
            fetcher,
            post_marker,
        }
    }

    /// Fetches the sitemap and extracts its post candidates
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PostCandidate>)` - At least one candidate, in first-seen order
    /// * `Err(AuditError::Fetch)` - The sitemap could not be fetched
    /// * `Err(AuditError::EmptySitemap)` - No location matched the post marker
    pub async fn resolve(&self, sitemap_url: &str) -> Result<Vec<PostCandidate>, AuditError> {
        tracing::info!(url = sitemap_url, "Fetching sitemap");
        let page = self.fetcher.fetch(sitemap_url).await?;

        let candidates = extract_post_candidates(&page.body, self.post_marker);
        if candidates.is_empty() {
            tracing::warn!(url = sitemap_url, marker = self.post_marker, "No post URLs in sitemap");
            return Err(AuditError::EmptySitemap {
                url: sitemap_url.to_string(),
            });
        }

        tracing::info!(
            url = sitemap_url,
            count = candidates.len(),
            "Resolved post candidates"
        );
        Ok(candidates)
    }
}

/// Extracts distinct post candidates from a sitemap body
///
/// Locations must contain `post_marker`; locations that fail normalization are
/// dropped. Order of first appearance is preserved.
///
/// # Example
///
/// ```
/// use blog_audit::pipeline::extract_post_candidates;
///
/// let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///     <url><loc>https://example.com/post/one</loc></url>
///     <url><loc>https://example.com/about</loc></url>
/// </urlset>"#;
/// let candidates = extract_post_candidates(xml, "/post/");
/// assert_eq!(candidates.len(), 1);
/// ```
pub fn extract_post_candidates(body: &str, post_marker: &str) -> Vec<PostCandidate> {
    let locations = match parse_locations(body) {
        Ok(locations) => locations,
        Err(e) => {
            tracing::debug!("Sitemap is not usable XML ({}), scanning as plain text", e);
            scan_plain_text(body)
        }
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for location in locations {
        if !location.contains(post_marker) {
            continue;
        }

        match PostCandidate::parse(&location) {
            Ok(candidate) => {
                if seen.insert(candidate.clone()) {
                    candidates.push(candidate);
                }
            }
            Err(e) => tracing::debug!(location = %location.trim(), "Dropping location: {}", e),
        }
    }

    candidates
}

/// Collects `loc` element text
///
/// Locations in the sitemap namespace win; if there are none, `loc` elements in any
/// other (or no) namespace are used instead.
fn parse_locations(xml: &str) -> Result<Vec<String>, SitemapParseError> {
    let mut reader = NsReader::from_str(xml);
    let mut namespaced = Vec::new();
    let mut other = Vec::new();
    let mut current: Option<(bool, String)> = None;
    let mut saw_element = false;
    let mut depth: usize = 0;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| SitemapParseError::Xml(e.to_string()))?;

        match event {
            Event::Start(e) => {
                saw_element = true;
                depth += 1;
                if e.local_name().as_ref() == b"loc" {
                    let in_sitemap_ns = matches!(
                        ns,
                        ResolveResult::Bound(Namespace(uri)) if uri == SITEMAP_NAMESPACE.as_bytes()
                    );
                    current = Some((in_sitemap_ns, String::new()));
                }
            }
            Event::Empty(_) => saw_element = true,
            Event::Text(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| SitemapParseError::Xml(e.to_string()))?;
                    buf.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if e.local_name().as_ref() == b"loc" {
                    if let Some((in_sitemap_ns, text)) = current.take() {
                        if in_sitemap_ns {
                            namespaced.push(text);
                        } else {
                            other.push(text);
                        }
                    }
                }
            }
            Event::Eof => {
                if depth > 0 || current.is_some() {
                    return Err(SitemapParseError::Xml(
                        "unexpected end of document".to_string(),
                    ));
                }
                break;
            }
            _ => {}
        }
    }

    if !saw_element {
        return Err(SitemapParseError::NoElements);
    }

    Ok(if namespaced.is_empty() {
        other
    } else {
        namespaced
    })
}

/// Splits a body on whitespace and pulls the URLs out of each token
fn scan_plain_text(body: &str) -> Vec<String> {
    body.split_whitespace()
        .flat_map(urls_in_token)
        .map(str::to_string)
        .collect()
}

/// Trims markup around the URLs embedded in a token such as `<loc>https://...</loc>`
///
/// A token without any `http(s)://` URL is returned whole.
fn urls_in_token(token: &str) -> Vec<&str> {
    let mut urls = Vec::new();
    let mut rest = token;

    while let Some(start) = next_url_start(rest) {
        let tail = &rest[start..];
        let end = tail.find(['<', '>', '"', '\'']).unwrap_or(tail.len());
        urls.push(&tail[..end]);
        rest = &tail[end..];
    }

    if urls.is_empty() {
        urls.push(token);
    }
    urls
}

fn next_url_start(text: &str) -> Option<usize> {
    match (text.find("https://"), text.find("http://")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
