// src/extract/mod.rs
// =============================================================================
// This module finds links in fetched content and turns them into canonical
// URLs.
//
// Submodules:
// - html: href/src attributes (and inline scripts) in HTML pages
// - script: absolute http(s) URLs embedded in JavaScript or plain text
// - markdown: link and image destinations in Markdown documents
// - normalize: resolve a raw link against its page, canonicalise it, and
//   drop anything excluded or not http/https
//
// Extraction is a pure function of (body, content type). It keeps the order
// in which links appear and does NOT deduplicate - the frontier does that at
// admission time.
// =============================================================================

mod html;
mod markdown;
mod normalize;
mod script;

pub use html::extract_html_links;
pub use markdown::extract_markdown_links;
pub use normalize::{Normalizer, Rejection};
pub use script::extract_script_links;

/// How a body should be searched for links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Script,
    Markdown,
    /// Images, archives, fonts... nothing to look at.
    Opaque,
}

impl ContentKind {
    /// Picks an extractor from a `Content-Type` header value.
    ///
    /// A missing header is treated as HTML, which is what most servers that
    /// forget the header are actually sending.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if mime.is_empty() || mime.contains("html") || mime.contains("xml") {
            ContentKind::Html
        } else if mime.contains("markdown") {
            ContentKind::Markdown
        } else if mime.contains("javascript")
            || mime.contains("ecmascript")
            || mime.contains("json")
            || mime.starts_with("text/")
        {
            ContentKind::Script
        } else {
            ContentKind::Opaque
        }
    }
}

/// Returns the raw (possibly relative) links found in `body`, in order.
pub fn extract_links(body: &str, content_type: Option<&str>) -> Vec<String> {
    match ContentKind::from_content_type(content_type) {
        ContentKind::Html => extract_html_links(body),
        ContentKind::Script => extract_script_links(body),
        ContentKind::Markdown => extract_markdown_links(body),
        ContentKind::Opaque => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_dispatch() {
        assert_eq!(ContentKind::from_content_type(None), ContentKind::Html);
        assert_eq!(
            ContentKind::from_content_type(Some("text/html; charset=utf-8")),
            ContentKind::Html
        );
        assert_eq!(
            ContentKind::from_content_type(Some("application/xhtml+xml")),
            ContentKind::Html
        );
        assert_eq!(
            ContentKind::from_content_type(Some("application/javascript")),
            ContentKind::Script
        );
        assert_eq!(
            ContentKind::from_content_type(Some("text/plain")),
            ContentKind::Script
        );
        assert_eq!(
            ContentKind::from_content_type(Some("text/markdown")),
            ContentKind::Markdown
        );
        assert_eq!(
            ContentKind::from_content_type(Some("image/png")),
            ContentKind::Opaque
        );
    }

    #[test]
    fn test_extract_links_uses_content_type() {
        let body = r#"<a href="/about">About</a> see https://example.com/raw"#;

        let as_html = extract_links(body, Some("text/html"));
        assert_eq!(as_html, vec!["/about"]);

        let as_script = extract_links(body, Some("application/javascript"));
        assert_eq!(as_script, vec!["https://example.com/raw"]);

        assert!(extract_links(body, Some("image/gif")).is_empty());
    }
}
