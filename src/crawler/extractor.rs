//! Link extraction collaborator
//!
//! The crawler consumes a sequence of absolute URL strings per fetched page
//! and does not care how they were produced. The default implementation
//! parses HTML anchors with scraper; tests can substitute anything that
//! implements [`LinkExtractor`].

use scraper::{Html, Selector};
use url::Url;

/// Produces the absolute URLs found on a fetched page
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, body: &str, base: &Url) -> Vec<String>;
}

/// Extracts links from `<a href>` anchors
///
/// Skips anchors with a `download` attribute and hrefs with non-navigational
/// schemes (`javascript:`, `mailto:`, `tel:`, `data:`). Relative hrefs are
/// resolved against the page URL.
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlLinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, body: &str, base: &Url) -> Vec<String> {
        let document = Html::parse_document(body);
        let mut links = Vec::new();

        let anchor_selector = match Selector::parse("a[href]") {
            Ok(selector) => selector,
            Err(_) => return links,
        };

        for element in document.select(&anchor_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            let href = match element.value().attr("href") {
                Some(href) => href.trim(),
                None => continue,
            };

            if href.is_empty() || has_skipped_scheme(href) {
                continue;
            }

            if let Ok(absolute) = base.join(href) {
                links.push(absolute.to_string());
            }
        }

        links
    }
}

fn has_skipped_scheme(href: &str) -> bool {
    let lower = href.to_lowercase();
    lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(body: &str, base: &str) -> Vec<String> {
        let base = Url::parse(base).unwrap();
        HtmlLinkExtractor::new().extract(body, &base)
    }

    #[test]
    fn test_absolute_and_relative_links() {
        let body = r#"<html><body>
            <a href="https://other.com/page">Absolute</a>
            <a href="/local">Relative</a>
            <a href="sibling">Sibling</a>
        </body></html>"#;

        let links = extract(body, "https://example.com/dir/");
        assert_eq!(
            links,
            vec![
                "https://other.com/page",
                "https://example.com/local",
                "https://example.com/dir/sibling",
            ]
        );
    }

    #[test]
    fn test_skips_non_navigational_schemes() {
        let body = r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:a@b.com">Mail</a>
            <a href="tel:+123">Phone</a>
            <a href="data:text/plain,x">Data</a>
            <a href="/real">Real</a>
        </body></html>"#;

        let links = extract(body, "https://example.com/");
        assert_eq!(links, vec!["https://example.com/real"]);
    }

    #[test]
    fn test_skips_download_anchors() {
        let body = r#"<a href="/file" download>File</a><a href="/page">Page</a>"#;
        let links = extract(body, "https://example.com/");
        assert_eq!(links, vec!["https://example.com/page"]);
    }

    #[test]
    fn test_empty_page_yields_nothing() {
        assert!(extract("<html><body>no links</body></html>", "https://example.com/").is_empty());
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let body = "<a href='/a'><div><a href='/b'</div>";
        let links = extract(body, "https://example.com/");
        assert!(links.contains(&"https://example.com/a".to_string()));
    }
}
