// src/extract/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM, the same way a browser would
// - Lowercases attribute names, so HREF="..." and href="..." both match
// - Decodes entities, so href="?a=1&amp;b=2" gives us "?a=1&b=2"
//
// What we collect, in document order:
// 1. every href and src attribute (href first when an element has both)
// 2. absolute URLs mentioned inside inline <script> blocks
//
// Links are returned raw. Resolving them against the page URL is the
// normalizer's job.
// =============================================================================

use scraper::{Html, Selector};

use super::script::extract_script_links;

pub fn extract_html_links(html: &str) -> Vec<String> {
    let mut links = Vec::new();

    let document = Html::parse_document(html);

    // Both selectors are constants, so parsing cannot fail.
    let attr_selector = Selector::parse("[href], [src]").expect("static selector");
    let script_selector = Selector::parse("script").expect("static selector");

    for element in document.select(&attr_selector) {
        for attr in ["href", "src"] {
            if let Some(value) = element.value().attr(attr) {
                let value = value.trim();
                if !value.is_empty() {
                    links.push(value.to_string());
                }
            }
        }
    }

    for script in document.select(&script_selector) {
        // External scripts are already covered by their src attribute.
        if script.value().attr("src").is_some() {
            continue;
        }
        let source: String = script.text().collect();
        links.extend(extract_script_links(&source));
    }

    links
}
