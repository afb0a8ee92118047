//! Cache key derivation for stored entries.

use sha2::{Digest, Sha256};

/// Compute the cache key for a resource.
///
/// Entries are conceptually keyed by method + URL; only GET-equivalent
/// reads are cached, so the method is fixed.
pub fn resource_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"GET");
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        let key1 = resource_key("https://example.com/styles.css");
        let key2 = resource_key("https://example.com/styles.css");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_key_differs_per_url() {
        let key1 = resource_key("https://example.com/a.js");
        let key2 = resource_key("https://example.com/b.js");
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_key_format() {
        let key = resource_key("https://example.com/");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
