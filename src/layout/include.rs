//! Include-prefix filtering of relative paths.

use super::RelativePath;

/// Set of relative-path prefixes an item must match to be acted upon.
///
/// An empty set keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludePrefixes(Vec<String>);

impl IncludePrefixes {
    /// Parses repeated and/or comma-separated prefix arguments.
    ///
    /// Each token is trimmed and slash-stripped; empty tokens are dropped.
    /// Matching is case-sensitive.
    #[must_use]
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Self {
        let mut prefixes: Vec<String> = Vec::new();
        for arg in raw {
            for token in arg.as_ref().split(',') {
                let token = token.trim().trim_start_matches('/');
                if !token.is_empty() && !prefixes.iter().any(|p| p == token) {
                    prefixes.push(token.to_string());
                }
            }
        }
        Self(prefixes)
    }

    /// Returns true when `rel` starts with one of the prefixes, or no prefix is set.
    #[must_use]
    pub fn matches(&self, rel: &RelativePath) -> bool {
        self.0.is_empty() || self.0.iter().any(|p| rel.as_str().starts_with(p.as_str()))
    }

    /// Returns true when no prefix was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the normalized prefixes.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
