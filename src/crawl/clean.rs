use url::Url;

/// Drops the fragment; parsing already re-encoded the query component,
/// so rendering the result yields the canonical form.
pub fn clean_url(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

/// Canonicalizes a raw URL string. Unparseable input comes back unchanged.
pub fn clean(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => clean_url(url).to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_fragment() {
        assert_eq!(
            clean("https://example.com/page#section-2"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_reencodes_query() {
        assert_eq!(
            clean("https://example.com/find?q=a b"),
            "https://example.com/find?q=a%20b"
        );
    }

    #[test]
    fn test_keeps_clean_urls() {
        assert_eq!(
            clean("https://example.com/a/b?q=1"),
            "https://example.com/a/b?q=1"
        );
    }

    #[test]
    fn test_unparseable_input_unchanged() {
        assert_eq!(clean("not a url"), "not a url");
        assert_eq!(clean("/relative/only"), "/relative/only");
    }
}
