use crate::analysis::{AnalysisError, SeoAnalysis};
use serde::Deserialize;

/// Appended to body text that was cut to fit the input budget
pub const TRUNCATION_MARKER: &str = " [truncated]";

/// Raw shape of the service's JSON object; every field may be missing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    #[serde(alias = "suggested_meta_description")]
    meta_description: Option<String>,

    #[serde(alias = "summary")]
    seo_summary: Option<String>,

    keywords: Option<RawKeywords>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawKeywords {
    List(Vec<String>),
    Joined(String),
}

impl RawKeywords {
    fn into_vec(self) -> Vec<String> {
        let items = match self {
            Self::List(items) => items,
            Self::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };

        items
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Keeps at most `max_chars` characters of `text`
///
/// When anything is cut, [`TRUNCATION_MARKER`] is appended.
///
/// # Example
///
/// ```
/// use blog_audit::analysis::truncate_body;
///
/// assert_eq!(truncate_body("short", 10), "short");
/// assert_eq!(truncate_body("abcdefgh", 3), "abc [truncated]");
/// ```
pub fn truncate_body(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Removes a surrounding markdown code fence, if any
///
/// Handles both bare fences and fences with a language tag such as `json`.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag on the opening line
    let rest = match rest.find('\n') {
        Some(newline) if !rest[..newline].trim_start().starts_with('{') => &rest[newline + 1..],
        _ => rest,
    };

    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

/// Parses the service's reply into an [`SeoAnalysis`]
///
/// The reply must be a JSON object, optionally wrapped in a code fence. Missing
/// fields become empty values; anything unparseable is an error.
///
/// # Example
///
/// ```
/// use blog_audit::analysis::parse_analysis;
///
/// let raw = "```json\n{\"meta_description\": \"m\", \"seo_summary\": \"s\", \"keywords\": [\"k\"]}\n```";
/// let analysis = parse_analysis(raw).unwrap();
/// assert_eq!(analysis.keywords, vec!["k"]);
/// ```
pub fn parse_analysis(raw: &str) -> Result<SeoAnalysis, AnalysisError> {
    let json = strip_code_fence(raw);
    if json.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| AnalysisError::Parse(e.to_string()))?;
    if !value.is_object() {
        return Err(AnalysisError::Parse(
            "expected a JSON object at the top level".to_string(),
        ));
    }

    let parsed: RawAnalysis =
        serde_json::from_value(value).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    Ok(SeoAnalysis {
        suggested_meta_description: parsed.meta_description.unwrap_or_default().trim().to_string(),
        seo_summary: parsed.seo_summary.unwrap_or_default().trim().to_string(),
        keywords: parsed.keywords.map(RawKeywords::into_vec).unwrap_or_default(),
    })
}
