//! Main-content extraction from arbitrary HTML
//!
//! This module derives a title, meta description, body text and word count from a
//! fetched page. Extraction never fails; missing pieces degrade to sentinels or
//! empty values.

use scraper::{ElementRef, Html, Selector};

/// Title used when a page has no usable `<title>`
pub const NO_TITLE: &str = "No title";

/// Elements whose text never counts as content
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Phrasing elements that do not break words apart
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "i", "ins",
    "kbd", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u",
    "var",
];

/// A candidate main-content container
#[derive(Debug, Clone, Copy)]
struct ContentRule {
    /// Name reported in logs
    label: &'static str,
    /// CSS selector for the container
    selector: &'static str,
}

impl ContentRule {
    const fn new(label: &'static str, selector: &'static str) -> Self {
        Self { label, selector }
    }
}

/// Main-content containers, most specific first; the first rule with a match wins
const CONTENT_RULES: &[ContentRule] = &[
    ContentRule::new("article", "article"),
    ContentRule::new("main", "main"),
    ContentRule::new("post-content", "div.post-content"),
    ContentRule::new("entry-content", "div.entry-content"),
    ContentRule::new("article-content", "div.article-content"),
    ContentRule::new("blog-content", "div.blog-content"),
    ContentRule::new("post-body", "div.post-body"),
    ContentRule::new("content", "div.content"),
    ContentRule::new("#post-content", "div#post-content"),
    ContentRule::new("#main-content", "div#main-content"),
    ContentRule::new("#content", "div#content"),
];

/// Readable content of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Collapsed `<title>` text, or [`NO_TITLE`]
    pub title: String,
    /// `description` meta tag, falling back to `og:description`
    pub meta_description: String,
    /// Whitespace-normalized main body text
    pub body_text: String,
    /// Number of whitespace-delimited tokens in `body_text`
    pub word_count: usize,
}

impl ExtractedContent {
    /// True when no body text could be found
    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }
}

/// Extracts title, meta description and main body text from HTML
///
/// # Body Selection
///
/// 1. Try each content rule in order (`article`, `main`, then common content
///    `div` classes and ids); the first rule matching any element is used
/// 2. Otherwise use the whole `<body>`
///
/// Script, style, navigation, header and footer descendants are skipped.
///
/// # Example
///
/// ```
/// use blog_audit::pipeline::extract;
///
/// let html = r#"<html><head><title>Hello</title></head>
///     <body><nav>Menu</nav><article><p>Two words</p></article></body></html>"#;
/// let content = extract(html);
/// assert_eq!(content.title, "Hello");
/// assert_eq!(content.body_text, "Two words");
/// assert_eq!(content.word_count, 2);
/// ```
pub fn extract(html: &str) -> ExtractedContent {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| NO_TITLE.to_string());
    let meta_description = extract_meta_description(&document);

    let raw_body = match find_main_container(&document) {
        Some((rule, container)) => {
            tracing::trace!(rule = rule.label, "Main content container matched");
            visible_text(container)
        }
        None => {
            tracing::trace!("No content container matched, using document body");
            document_body_text(&document)
        }
    };

    let body_text = collapse_whitespace(&raw_body);
    let word_count = body_text.split_whitespace().count();

    ExtractedContent {
        title,
        meta_description,
        body_text,
        word_count,
    }
}

/// Collapses every whitespace run to a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

fn extract_meta_description(document: &Html) -> String {
    let Ok(meta_selector) = Selector::parse("meta[content]") else {
        return String::new();
    };

    let meta_content = |key: &str, value: &str| {
        document
            .select(&meta_selector)
            .filter(|meta| {
                meta.value()
                    .attr(key)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
            })
            .filter_map(|meta| meta.value().attr("content"))
            .map(collapse_whitespace)
            .find(|content| !content.is_empty())
    };

    meta_content("name", "description")
        .or_else(|| meta_content("property", "og:description"))
        .unwrap_or_default()
}

fn find_main_container(document: &Html) -> Option<(ContentRule, ElementRef<'_>)> {
    CONTENT_RULES.iter().find_map(|rule| {
        let selector = Selector::parse(rule.selector).ok()?;
        document
            .select(&selector)
            .next()
            .map(|element| (*rule, element))
    })
}

fn document_body_text(document: &Html) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    visible_text(body.unwrap_or_else(|| document.root_element()))
}

/// Text of `element`, skipping non-content descendants
fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if NON_CONTENT_TAGS.contains(&name) {
                continue;
            }

            // Block boundaries separate words; inline markup does not
            let inline = INLINE_TAGS.contains(&name);
            if !inline {
                out.push(' ');
            }
            collect_text(child_element, out);
            if !inline {
                out.push(' ');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}
