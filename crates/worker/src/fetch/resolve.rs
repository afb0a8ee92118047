//! Resource identifier resolution for consistent cache keying.
//!
//! Manifest entries and request identifiers may be site-relative paths
//! (`/offline.html`) or absolute URLs; both resolve to a canonical URL
//! before being keyed.

/// Error type for resource resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("empty resource identifier")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid resource identifier: {0}")]
    Invalid(String),
}

/// Resolve a resource identifier against the site origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Join site-relative identifiers onto the origin
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(origin: &str, resource: &str) -> Result<url::Url, ResolveError> {
    let trimmed = resource.trim();

    if trimmed.is_empty() {
        return Err(ResolveError::Empty);
    }

    let mut parsed = if trimmed.contains("://") {
        url::Url::parse(trimmed).map_err(|e| ResolveError::Invalid(e.to_string()))?
    } else {
        let base = url::Url::parse(origin).map_err(|e| ResolveError::Invalid(format!("bad origin {origin}: {e}")))?;
        base.join(trimmed).map_err(|e| ResolveError::Invalid(e.to_string()))?
    };

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(ResolveError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(mut host) = parsed.host_str() {
        let h = host.to_lowercase();
        host = h.as_str();
        parsed
            .set_host(Some(host))
            .map_err(|e| ResolveError::Invalid(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://game.example";

    #[test]
    fn test_resolve_root() {
        let url = resolve(ORIGIN, "/").unwrap();
        assert_eq!(url.as_str(), "https://game.example/");
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve(ORIGIN, "/offline.html").unwrap();
        assert_eq!(url.as_str(), "https://game.example/offline.html");
    }

    #[test]
    fn test_resolve_absolute_url() {
        let url = resolve(ORIGIN, "https://cdn.example/lib.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example"));
        assert_eq!(url.path(), "/lib.js");
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(ORIGIN, "https://CDN.EXAMPLE/lib.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(ORIGIN, "/index.html#rules").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/index.html");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(ORIGIN, "/scores?board=daily&top=10").unwrap();
        assert_eq!(url.query(), Some("board=daily&top=10"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(ORIGIN, "  /styles.css  ").unwrap();
        assert_eq!(url.path(), "/styles.css");
    }

    #[test]
    fn test_resolve_empty() {
        let result = resolve(ORIGIN, "");
        assert!(matches!(result, Err(ResolveError::Empty)));
    }

    #[test]
    fn test_resolve_whitespace_only() {
        let result = resolve(ORIGIN, "   ");
        assert!(matches!(result, Err(ResolveError::Empty)));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(ORIGIN, "file:///etc/passwd");
        assert!(matches!(result, Err(ResolveError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_bad_origin() {
        let result = resolve("not a url", "/index.html");
        assert!(matches!(result, Err(ResolveError::Invalid(_))));
    }
}
