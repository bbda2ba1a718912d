use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

use crate::core::error::{Error, ErrorKind, Result};

/// Fetches HTML pages, following redirects itself so the hop budget is
/// honored exactly.
pub struct HtmlFetcher {
    client: Client,
}

impl HtmlFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("trawler/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HtmlFetcher { client })
    }

    /// One GET against `url`. Returns the body only for a 200 response
    /// whose first `Content-Type` value starts with `text/html` (any
    /// casing). A 3xx response with a `Location` header is re-fetched
    /// with one less hop while `redirects > 0`. Everything else is a
    /// per-URL error for the caller to log and skip.
    pub fn fetch(&self, url: &Url, redirects: usize) -> Result<String> {
        let response = self.client.get(url.clone()).send()?;

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| {
                    Error::new(
                        ErrorKind::Fetch,
                        format!("redirect without location from {}", url),
                    )
                })?;
            if redirects == 0 {
                return Err(Error::new(
                    ErrorKind::TooManyRedirects,
                    format!("redirect budget exhausted at {}", url),
                ));
            }
            let next = url.join(location)?;
            return self.fetch(&next, redirects - 1);
        }

        if status != StatusCode::OK {
            return Err(Error::new(
                ErrorKind::Fetch,
                format!("{} answered {}", url, status),
            ));
        }
        if !is_html(&response) {
            return Err(Error::new(
                ErrorKind::NonHtml,
                format!("{} is not text/html", url),
            ));
        }

        Ok(response.text()?)
    }
}

fn is_html(response: &reqwest::blocking::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::testing::{Page, serve};
    use std::collections::HashMap;

    fn fetch(base: &str, path: &str, redirects: usize) -> Result<String> {
        let url = Url::parse(&format!("{}{}", base, path)).unwrap();
        HtmlFetcher::new().unwrap().fetch(&url, redirects)
    }

    #[test]
    fn test_returns_html_body() {
        let base = serve(HashMap::from([(
            "/page".to_string(),
            Page::html("<p>hello</p>"),
        )]));

        assert_eq!(fetch(&base, "/page", 3).unwrap(), "<p>hello</p>");
    }

    #[test]
    fn test_rejects_non_html() {
        let base = serve(HashMap::from([(
            "/notes".to_string(),
            Page::plain("just text"),
        )]));

        let err = fetch(&base, "/notes", 3).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NonHtml);
    }

    #[test]
    fn test_rejects_missing_page() {
        let base = serve(HashMap::new());

        let err = fetch(&base, "/gone", 3).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Fetch);
    }

    #[test]
    fn test_follows_redirects_within_budget() {
        let base = serve(HashMap::from([
            ("/a".to_string(), Page::redirect("/b")),
            ("/b".to_string(), Page::redirect("/c")),
            ("/c".to_string(), Page::html("landed")),
        ]));

        assert_eq!(fetch(&base, "/a", 2).unwrap(), "landed");
        assert_eq!(fetch(&base, "/a", 3).unwrap(), "landed");
    }

    #[test]
    fn test_redirect_budget_exhausts() {
        let base = serve(HashMap::from([
            ("/a".to_string(), Page::redirect("/b")),
            ("/b".to_string(), Page::redirect("/c")),
            ("/c".to_string(), Page::html("landed")),
        ]));

        assert_eq!(
            fetch(&base, "/a", 1).unwrap_err().kind,
            ErrorKind::TooManyRedirects
        );
        assert_eq!(
            fetch(&base, "/a", 0).unwrap_err().kind,
            ErrorKind::TooManyRedirects
        );
    }

    #[test]
    fn test_redirect_loop_gives_up() {
        let base = serve(HashMap::from([
            ("/x".to_string(), Page::redirect("/y")),
            ("/y".to_string(), Page::redirect("/x")),
        ]));

        assert_eq!(
            fetch(&base, "/x", 3).unwrap_err().kind,
            ErrorKind::TooManyRedirects
        );
    }
}
