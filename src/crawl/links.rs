use log::debug;
use regex::Regex;
use url::Url;

use crate::core::error::Result;
use crate::crawl::clean;

/// Extracts anchor targets from raw HTML.
pub struct LinkParser {
    anchor: Regex,
}

impl LinkParser {
    pub fn new() -> Result<Self> {
        // Tolerant of attribute order, stray whitespace, and any casing;
        // only double-quoted href values are considered.
        let anchor = Regex::new(r#"(?is)<a\s+(?:[^<>]*?\s+)?href\s*=\s*"([^"]*)""#)?;
        Ok(LinkParser { anchor })
    }

    /// Every `<a href>` target in source order, resolved against `base`,
    /// fragment-stripped and query-re-encoded. Unresolvable hrefs are
    /// skipped.
    pub fn list_links(&self, base: &Url, html: &str) -> Vec<Url> {
        self.anchor
            .captures_iter(html)
            .filter_map(|capture| {
                let href = &capture[1];
                match base.join(href) {
                    Ok(url) => Some(clean::clean_url(url)),
                    Err(err) => {
                        debug!("dropping unresolvable href {:?}: {}", href, err);
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(base: &str, html: &str) -> Vec<String> {
        let base = Url::parse(base).unwrap();
        LinkParser::new()
            .unwrap()
            .list_links(&base, html)
            .iter()
            .map(Url::to_string)
            .collect()
    }

    #[test]
    fn test_source_order_preserved() {
        let html = r#"<a href="https://a.test/1"><a href="https://a.test/2"><a href="https://a.test/3">"#;
        assert_eq!(
            links("https://a.test/", html),
            ["https://a.test/1", "https://a.test/2", "https://a.test/3"]
        );
    }

    #[test]
    fn test_relative_hrefs_resolve_against_base() {
        let html = r#"<a href="sub/page.html"> and <a href="/rooted">"#;
        assert_eq!(
            links("https://a.test/dir/index.html", html),
            ["https://a.test/dir/sub/page.html", "https://a.test/rooted"]
        );
    }

    #[test]
    fn test_tolerates_casing_and_extra_attributes() {
        let html = r#"<A CLASS="nav" tabindex="3"
            HREF="https://a.test/x">link</A>"#;
        assert_eq!(links("https://a.test/", html), ["https://a.test/x"]);
    }

    #[test]
    fn test_fragments_stripped() {
        let html = r##"<a href="page.html#middle">"##;
        assert_eq!(links("https://a.test/", html), ["https://a.test/page.html"]);
    }

    #[test]
    fn test_non_anchor_hrefs_ignored() {
        let html = r#"<link href="style.css"><area href="map.html">"#;
        assert!(links("https://a.test/", html).is_empty());
    }
}
