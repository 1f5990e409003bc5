// src/extract/normalize.rs
// =============================================================================
// Turns a raw link into the canonical URL used as the deduplication key.
//
// Steps:
// 1. resolve it against the page it was found on (relative links)
// 2. drop the #fragment - it never changes what the server sends back
// 3. keep only http and https
// 4. drop it if the canonical form matches the exclusion pattern
//
// The url crate already lowercases scheme and host, removes default ports
// and resolves ./ and ../ segments while parsing, so two spellings of the
// same page end up with the same string.
// =============================================================================

use regex::Regex;
use url::Url;

/// Why a candidate link was not turned into a crawl target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Could not be parsed or resolved.
    Malformed,
    /// mailto:, javascript:, data:, ftp:, ...
    UnsupportedScheme,
    /// Matched the exclusion pattern.
    Excluded,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Malformed => "malformed",
            Rejection::UnsupportedScheme => "unsupported_scheme",
            Rejection::Excluded => "excluded",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    exclude: Regex,
}

impl Normalizer {
    pub fn new(exclude: Regex) -> Self {
        Self { exclude }
    }

    pub fn normalize(&self, raw: &str, base: &Url) -> Result<Url, Rejection> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Rejection::Malformed);
        }

        let mut url = base.join(raw).map_err(|_| Rejection::Malformed)?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Rejection::UnsupportedScheme);
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(Rejection::Malformed);
        }

        url.set_fragment(None);

        if self.exclude.is_match(url.as_str()) {
            return Err(Rejection::Excluded);
        }

        Ok(url)
    }
}
