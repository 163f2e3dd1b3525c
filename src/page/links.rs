//! Outbound hyperlink extraction.
//!
//! Collects `<a href>` targets, resolves them against the page's final URL
//! (so redirects are honored), strips fragments, and de-duplicates while
//! preserving document order.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

/// Extract absolute, fragment-free link targets from an HTML document.
/// `base_url` should be the response's final URL. Unresolvable hrefs are
/// skipped.
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };
    let Some(selector) = Selector::parse("a[href]").ok() else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for el in document.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = base.join(href.trim()) else {
            continue;
        };
        resolved.set_fragment(None);
        let link: String = resolved.into();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_links() {
        let html = r#"<a href="/about">About</a> <a href="people.html">People</a>"#;
        let links = extract_links(html, "http://ics.uci.edu/dept/");
        assert_eq!(
            links,
            vec![
                "http://ics.uci.edu/about".to_string(),
                "http://ics.uci.edu/dept/people.html".to_string(),
            ]
        );
    }

    #[test]
    fn strips_fragments_and_dedupes() {
        let html = r#"
            <a href="/x#top">one</a>
            <a href="/x#bottom">two</a>
            <a href="/x">three</a>
        "#;
        let links = extract_links(html, "http://ics.uci.edu/");
        assert_eq!(links, vec!["http://ics.uci.edu/x".to_string()]);
    }

    #[test]
    fn keeps_absolute_links_elsewhere() {
        let html = r#"<a href="http://example.com/page">ext</a>"#;
        let links = extract_links(html, "http://ics.uci.edu/");
        assert_eq!(links, vec!["http://example.com/page".to_string()]);
    }

    #[test]
    fn no_links_in_plain_page() {
        assert!(extract_links("<p>no anchors here</p>", "http://ics.uci.edu/").is_empty());
    }
}
