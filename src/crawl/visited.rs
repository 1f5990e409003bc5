// src/crawl/visited.rs
// Set of canonical URLs that have been admitted to the frontier.

use std::collections::HashSet;

use url::Url;

/// Every canonical URL ever admitted. Entries are never removed.
///
/// Not synchronised on its own: the frontier keeps it under the same lock
/// as its counters, so "is it new?", "mark it" and "count it" happen in one
/// critical section.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url.as_str())
    }

    /// Marks `url` visited. Returns false if it already was.
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.as_str().to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_once() {
        let mut visited = VisitedSet::new();
        let url = Url::parse("http://a.test/x").unwrap();

        assert_eq!(visited.len(), 0);
        assert!(visited.insert(&url));
        assert!(!visited.insert(&url));
        assert!(visited.contains(&url));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_keys_are_canonical_strings() {
        let mut visited = VisitedSet::new();
        visited.insert(&Url::parse("HTTP://A.test:80/x").unwrap());
        assert!(visited.contains(&Url::parse("http://a.test/x").unwrap()));
    }
}
