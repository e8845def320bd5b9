use crate::error::{AuditError, Result};
use url::Url;

/// Normalize a user-supplied URL into an absolute http(s) URL.
///
/// Missing schemes default to `https`, an empty path becomes `/`, the query
/// string is kept and the fragment is dropped. Input without a determinable
/// host (blank strings, bare paths) is rejected.
pub fn normalize_url(raw: &str) -> Result<Url> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return Err(AuditError::InvalidUrl(raw.to_string()));
    }

    let mut url = match Url::parse(cleaned) {
        // "localhost:8000/foo" parses with scheme "localhost" and no host,
        // so only accept direct parses that actually carry a host.
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => url,
        _ => parse_without_scheme(cleaned).ok_or_else(|| AuditError::InvalidUrl(raw.to_string()))?,
    };

    url.set_fragment(None);
    if url.path().is_empty() {
        url.set_path("/");
    }

    Ok(url)
}

fn parse_without_scheme(cleaned: &str) -> Option<Url> {
    let candidate = if let Some(rest) = cleaned.strip_prefix("//") {
        format!("https://{}", rest)
    } else if cleaned.starts_with('/') {
        return None;
    } else {
        format!("https://{}", cleaned)
    };

    Url::parse(&candidate)
        .ok()
        .filter(|url| url.host_str().is_some_and(|h| !h.is_empty()))
}

/// True iff both URLs share scheme, host and port.
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port() == b.port()
}

/// Resolve `href` against `base` using standard relative-reference rules.
pub fn to_absolute(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

/// `scheme://authority` for a URL, used to build well-known resource URLs.
pub fn origin_of(url: &Url) -> String {
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), url.host_str().unwrap_or(""), port),
        None => format!("{}://{}", url.scheme(), url.host_str().unwrap_or("")),
    }
}

pub fn clamp(n: f64, lo: f64, hi: f64) -> f64 {
    n.max(lo).min(hi)
}

/// Round to one decimal place, the precision used for all reported scores.
pub fn round1(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}
