//! URL canonicalization and favicon keys
//!
//! The canonical form is whatever the WHATWG serializer of the `url` crate
//! produces: lowercase scheme and host, default ports dropped, an empty path
//! on special schemes becomes `/`, dot segments resolved. No further rules
//! (query sorting, tracking parameter removal) are applied.

use sha2::{Digest, Sha256};
use url::Url;

/// Prefix of every favicon key
const FAVICON_ID_PREFIX: &str = "fav_";
/// Number of hex digits of the domain hash kept in a favicon key
const FAVICON_HASH_LEN: usize = 12;

/// Normalize a URL for deduplication, falling back to the input unchanged
/// when it cannot be parsed.
pub fn canonicalize_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::trace!(url = %raw, error = %e, "URL not canonicalizable, keeping raw");
            raw.to_string()
        }
    }
}

/// Network location of a URL with a leading `www.` removed.
///
/// Includes the port when it is not the scheme default. URLs without a host
/// (`about:blank`, `data:`, unparseable input) yield an empty string.
pub fn domain_of(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };

    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    let host = host.strip_prefix("www.").unwrap_or(host);

    match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Stable short key for the favicon of a domain.
pub fn favicon_id(domain: &str) -> String {
    let digest = Sha256::digest(domain.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}{}", FAVICON_ID_PREFIX, &hex[..FAVICON_HASH_LEN])
}

/// Everything the history and favicon ledgers derive from a raw page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageKey {
    pub canonical_url: String,
    pub domain: String,
    pub favicon_id: String,
}

impl PageKey {
    pub fn from_url(raw: &str) -> Self {
        let canonical_url = canonicalize_url(raw);
        let domain = domain_of(&canonical_url);
        let favicon_id = favicon_id(&domain);

        Self {
            canonical_url,
            domain,
            favicon_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_normalizes_host_and_port() {
        assert_eq!(
            canonicalize_url("HTTPS://Example.COM:443"),
            "https://example.com/"
        );
        assert_eq!(
            canonicalize_url("http://example.com:80/a/./b/../c"),
            "http://example.com/a/c"
        );
    }

    #[test]
    fn test_canonicalize_falls_back_to_raw() {
        assert_eq!(canonicalize_url("not a url"), "not a url");
        assert_eq!(canonicalize_url(""), "");
    }

    #[test]
    fn test_domain_strips_leading_www_only() {
        assert_eq!(domain_of("https://www.example.com/page"), "example.com");
        assert_eq!(domain_of("https://news.www.example.com/"), "news.www.example.com");
        assert_eq!(domain_of("http://localhost:8080/"), "localhost:8080");
    }

    #[test]
    fn test_domain_empty_for_hostless_urls() {
        assert_eq!(domain_of("about:blank"), "");
        assert_eq!(domain_of("garbage"), "");
    }

    #[test]
    fn test_favicon_id_shape() {
        let id = favicon_id("example.com");
        assert!(id.starts_with("fav_"));
        assert_eq!(id.len(), 4 + 12);
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_favicon_id_is_pure_function_of_domain() {
        assert_eq!(favicon_id("example.com"), favicon_id("example.com"));
        assert_ne!(favicon_id("example.com"), favicon_id("example.org"));

        // sha256("") starts with e3b0c44298fc
        assert_eq!(favicon_id(""), "fav_e3b0c44298fc");
    }

    #[test]
    fn test_pages_on_same_domain_share_favicon() {
        let a = PageKey::from_url("https://www.example.com/one?x=1");
        let b = PageKey::from_url("https://example.com/two#frag");
        assert_eq!(a.domain, "example.com");
        assert_eq!(a.favicon_id, b.favicon_id);
        assert_ne!(a.canonical_url, b.canonical_url);
    }
}
