//! Resolution of the submission token from an invitation link.

use percent_encoding::percent_decode_str;
use url::Url;

/// Query parameters that may carry the token, in order of preference.
const TOKEN_PARAMS: [&str; 2] = ["token", "uuid"];

/// Base used to make relative links (`/abc123`, `?uuid=x`) parseable.
const PLACEHOLDER_BASE: &str = "http://intake.invalid/";

/// Extracts the token from a link.
///
/// A `token` (or legacy `uuid`) query parameter wins; otherwise the last
/// non-empty path segment is used. Returns `None` when nothing usable is found.
///
/// # Examples
///
/// ```
/// use intake::domain::resolve_token;
///
/// assert_eq!(resolve_token("https://form.example/?uuid=abc123").as_deref(), Some("abc123"));
/// assert_eq!(resolve_token("https://form.example/r/abc123/").as_deref(), Some("abc123"));
/// assert_eq!(resolve_token("https://form.example/"), None);
/// ```
pub fn resolve_token(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    let base = Url::parse(PLACEHOLDER_BASE).ok()?;
    let url = match Url::parse(link) {
        Ok(url) if !url.cannot_be_a_base() => url,
        // A bare `a:b` parses as scheme `a`; treat it as a relative path.
        Ok(_) => base.join(&format!("./{link}")).ok()?,
        Err(_) => base.join(link).ok()?,
    };

    for param in TOKEN_PARAMS {
        let value = url
            .query_pairs()
            .find(|(key, _)| key == param)
            .map(|(_, value)| value.trim().to_string());
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            return Some(value);
        }
    }

    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
        .and_then(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            let decoded = decoded.trim();
            (!decoded.is_empty()).then(|| decoded.to_string())
        })
}
