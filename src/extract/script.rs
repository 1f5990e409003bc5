// src/extract/script.rs
// Absolute URL scanning for JavaScript (and any other text without markup).

use std::sync::OnceLock;

use regex::Regex;

// Stops at whitespace, quotes, angle brackets, backticks and backslashes:
// the usual ends of a string literal or an escaped sequence.
const ABSOLUTE_URL: &str = r#"(?i)https?://[^\s"'<>`\\]+"#;

fn absolute_url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(ABSOLUTE_URL).expect("static regex"))
}

/// Returns every `http://` / `https://` literal in `content`, in order.
pub fn extract_script_links(content: &str) -> Vec<String> {
    absolute_url_regex()
        .find_iter(content)
        .map(|m| trim_trailing_punctuation(m.as_str()).to_string())
        .filter(|link| link.len() > "http://".len())
        .collect()
}

// "see https://example.com/page." should not follow "page."
fn trim_trailing_punctuation(link: &str) -> &str {
    link.trim_end_matches(|c| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literals() {
        let js = r#"
            const api = "https://api.example.com/v1";
            load('http://cdn.example.com/lib.js');
            const tpl = `https://example.com/items`;
        "#;
        assert_eq!(
            extract_script_links(js),
            vec![
                "https://api.example.com/v1",
                "http://cdn.example.com/lib.js",
                "https://example.com/items",
            ]
        );
    }

    #[test]
    fn test_case_insensitive_scheme() {
        assert_eq!(
            extract_script_links("var u = 'HTTPS://Example.com/X';"),
            vec!["HTTPS://Example.com/X"]
        );
    }

    #[test]
    fn test_trailing_punctuation_is_trimmed() {
        let text = "Docs live at https://example.com/docs. Mirror (https://mirror.example.com/).";
        assert_eq!(
            extract_script_links(text),
            vec!["https://example.com/docs", "https://mirror.example.com/"]
        );
    }

    #[test]
    fn test_no_relative_links() {
        assert!(extract_script_links("import x from './x.js'; fetch('/api')").is_empty());
    }
}
