// src/extract/markdown.rs
// =============================================================================
// This module extracts links from Markdown documents (text/markdown).
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Resolves reference-style links ([text][ref]) for us
//
// Unlike the HTML extractor we keep relative destinations too: a README that
// links to ./docs/guide.md is pointing at a page we may want to crawl.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};

pub fn extract_markdown_links(markdown: &str) -> Vec<String> {
    let mut links = Vec::new();

    for event in Parser::new(markdown) {
        // In pulldown-cmark 0.9, Link and Image are (link_type, dest_url, title)
        if let Event::Start(Tag::Link(_, dest_url, _) | Tag::Image(_, dest_url, _)) = event {
            let url = dest_url.trim();
            if !url.is_empty() {
                links.push(url.to_string());
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_link() {
        let markdown = "Check out [Rust](https://www.rust-lang.org)!";
        assert_eq!(extract_markdown_links(markdown), vec!["https://www.rust-lang.org"]);
    }

    #[test]
    fn test_relative_links_and_images_in_order() {
        let markdown = r#"
# Resources

- [Guide](./docs/guide.md)
- ![Logo](/img/logo.svg)
- [Cargo](https://doc.rust-lang.org/cargo/)
        "#;
        assert_eq!(
            extract_markdown_links(markdown),
            vec!["./docs/guide.md", "/img/logo.svg", "https://doc.rust-lang.org/cargo/"]
        );
    }

    #[test]
    fn test_reference_links() {
        let markdown = "See [the book][book].\n\n[book]: https://doc.rust-lang.org/book/\n";
        assert_eq!(extract_markdown_links(markdown), vec!["https://doc.rust-lang.org/book/"]);
    }
}
