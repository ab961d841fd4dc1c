//! Final request URL construction.
//!
//! Path segments are joined onto the base path with lexical cleaning (no
//! duplicate separators, `.` dropped, `..` resolved, no trailing slash).
//! Query parameters replace same-named keys of the base query and the result
//! is re-encoded in key order.

use std::collections::BTreeMap;

use url::Url;

use crate::error::{DispatchError, UrlError};

/// Parse `base` and apply `segments` and `query` to a copy of it.
pub fn build_url<S: AsRef<str>>(
    base: &str,
    segments: &[S],
    query: &BTreeMap<String, String>,
) -> Result<Url, DispatchError> {
    let invalid = |source: UrlError| DispatchError::InvalidUrl {
        url: base.to_string(),
        source,
    };
    if base.chars().any(|c| c.is_ascii_control()) {
        return Err(invalid(UrlError::ControlCharacter));
    }
    let mut url = Url::parse(base).map_err(|e| invalid(e.into()))?;

    // Opaque URLs (mailto:, data:) have no hierarchical path to join onto.
    if !url.cannot_be_a_base() {
        let path = join_path(url.path(), segments);
        url.set_path(&path);
    }

    if !query.is_empty() {
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .into_owned()
            .filter(|(key, _)| !query.contains_key(key))
            .collect();
        pairs.extend(query.iter().map(|(k, v)| (k.clone(), v.clone())));
        // Stable: repeated base keys keep their relative order.
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        url.query_pairs_mut().clear().extend_pairs(&pairs);
    }

    Ok(url)
}

/// Join `segments` onto `base` and clean the result lexically.
///
/// The returned path is always rooted.
pub fn join_path<S: AsRef<str>>(base: &str, segments: &[S]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let pieces = std::iter::once(base).chain(segments.iter().map(AsRef::as_ref));
    for piece in pieces {
        for part in piece.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }
    }
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_query() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn join_appends_segments_in_order() {
        assert_eq!(join_path("/", &["v1", "pay"]), "/v1/pay");
        assert_eq!(join_path("/api", &["v1", "pay"]), "/api/v1/pay");
    }

    #[test]
    fn join_collapses_redundant_separators() {
        assert_eq!(join_path("/api/", &["/v1/", "//pay/"]), "/api/v1/pay");
        assert_eq!(join_path("//", &["a//b"]), "/a/b");
    }

    #[test]
    fn join_resolves_dot_segments() {
        assert_eq!(join_path("/api/v0", &["..", "v1", ".", "pay"]), "/api/v1/pay");
        assert_eq!(join_path("/", &["..", "..", "pay"]), "/pay");
    }

    #[test]
    fn join_without_segments_cleans_base() {
        let empty: [&str; 0] = [];
        assert_eq!(join_path("/api/", &empty), "/api");
        assert_eq!(join_path("", &empty), "/");
    }

    #[test]
    fn build_url_joins_path() {
        let url = build_url("https://api.example.test/base/", &["v1", "pay"], &no_query()).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/base/v1/pay");
    }

    #[test]
    fn build_url_keeps_base_query_when_no_params() {
        let url = build_url("https://api.example.test/?z=1&a=2", &["x"], &no_query()).unwrap();
        assert_eq!(url.query(), Some("z=1&a=2"));
    }

    #[test]
    fn build_url_params_override_base_keys() {
        let mut query = BTreeMap::new();
        query.insert("x".to_string(), "1".to_string());
        query.insert("mode".to_string(), "live".to_string());
        let url = build_url(
            "https://api.example.test/?x=old&x=older&keep=yes",
            &["v1"],
            &query,
        )
        .unwrap();
        assert_eq!(url.query(), Some("keep=yes&mode=live&x=1"));
    }

    #[test]
    fn build_url_encodes_query_values() {
        let mut query = BTreeMap::new();
        query.insert("q".to_string(), "a b&c".to_string());
        let url = build_url("https://api.example.test", &["v1"], &query).unwrap();
        assert_eq!(url.query(), Some("q=a+b%26c"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("q".to_string(), "a b&c".to_string())]);
    }

    #[test]
    fn build_url_rejects_unparseable_base() {
        let err = build_url("not a url", &["v1"], &no_query()).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InvalidUrl {
                source: UrlError::Parse(_),
                ..
            }
        ));
        assert_eq!(err.stage(), "url");
    }

    #[test]
    fn build_url_rejects_control_characters_anywhere() {
        let bases = [
            "ht\ttp://api.example.test",
            "https://api.exa\nmple.test",
            "https://api.example.test/\u{1}x",
            "\u{1}https://api.example.test",
            "\u{7f}https://api.example.test",
        ];
        for base in bases {
            let err = build_url(base, &["v1"], &no_query()).unwrap_err();
            match err {
                DispatchError::InvalidUrl { url, source } => {
                    assert_eq!(url, base);
                    assert_eq!(source, UrlError::ControlCharacter);
                }
                other => panic!("{base:?}: expected invalid url, got {other:?}"),
            }
        }
    }
}
