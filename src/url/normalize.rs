use crate::NormalizeError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in the path, query and fragment
///
/// Unreserved characters stay literal, as do the structural delimiters
/// `:` `/` `?` `=` `&` `#`.
const TAIL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'=')
    .remove(b'&')
    .remove(b'#');

/// Cleans a raw URL string pulled out of sitemap or feed text
///
/// # Normalization Steps
///
/// 1. Collapse whitespace runs, then drop every whitespace and control character,
///    so a URL wrapped across lines is rejoined
/// 2. Split on the first `://`; without a scheme separator the cleaned text is
///    returned as-is and the caller decides whether it is usable
/// 3. Leave scheme and host untouched
/// 4. Percent-encode the path, query and fragment, keeping existing `%XX`
///    escapes so a second pass changes nothing
///
/// # Examples
///
/// ```
/// use blog_audit::url::normalize;
///
/// let url = normalize("https://example.com/post/caf\u{e9} tips\n").unwrap();
/// assert_eq!(url, "https://example.com/post/caf%C3%A9tips");
/// ```
pub fn normalize(raw: &str) -> Result<String, NormalizeError> {
    let cleaned = strip_whitespace(raw);
    if cleaned.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let Some((scheme, rest)) = cleaned.split_once("://") else {
        return Ok(cleaned);
    };

    if !is_valid_scheme(scheme) {
        return Err(NormalizeError::InvalidScheme(scheme.to_string()));
    }

    let (authority, tail) = match rest.find(['/', '?', '#']) {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    if authority.is_empty() {
        return Err(NormalizeError::MissingHost(cleaned.clone()));
    }

    Ok(format!("{}://{}{}", scheme, authority, encode_tail(tail)))
}

fn strip_whitespace(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().filter(|c| *c > ' ').collect()
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

fn encode_tail(tail: &str) -> String {
    let mut out = String::with_capacity(tail.len());
    let mut rest = tail;

    while let Some(pos) = rest.find('%') {
        out.extend(utf8_percent_encode(&rest[..pos], TAIL_ENCODE_SET));
        let after = &rest[pos + 1..];
        if starts_with_hex_pair(after) {
            out.push('%');
            out.push_str(&after[..2]);
            rest = &after[2..];
        } else {
            out.push_str("%25");
            rest = after;
        }
    }

    out.extend(utf8_percent_encode(rest, TAIL_ENCODE_SET));
    out
}

fn starts_with_hex_pair(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_hexdigit() && bytes[1].is_ascii_hexdigit()
}
