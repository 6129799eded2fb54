//! URL discovery over a manifest tree.
//!
//! Discovery runs a fixed chain of [`ExtractionStrategy`] values and keeps
//! the output of the first one that finds anything:
//!
//! 1. [`ExtractionStrategy::TaggedKeys`] - only values under keys that name
//!    data paths (`data-path`, `data_path`, `data-paths`, `data_paths`, or a
//!    `paths` key directly inside a `data` mapping), at any depth.
//! 2. [`ExtractionStrategy::FullScan`] - every string scalar in the document.
//!
//! The final list is deduplicated in first-seen order and restricted to
//! `http://` / `https://` URLs.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, trace};

use super::{Manifest, ManifestNode};

/// Matches http:// or https:// followed by every non-whitespace character.
///
/// Quotes, brackets and trailing punctuation stay part of the URL; a scalar
/// value is taken as written.
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://\S+").expect("URL regex is valid") // Static pattern, safe to panic
});

/// Key spellings that mark a subtree as holding data paths.
const TAGGED_KEYS: [&str; 4] = ["data-path", "data_path", "data-paths", "data_paths"];

/// `data: { paths: [...] }` is also treated as tagged.
const DATA_SECTION_KEY: &str = "data";
const DATA_SECTION_PATHS_KEY: &str = "paths";

/// One way of collecting URL candidates from a manifest tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Collect URLs only below recognized data-path keys.
    TaggedKeys,
    /// Collect URLs from every string scalar.
    FullScan,
}

impl ExtractionStrategy {
    /// Strategies in the order they are tried.
    pub const CHAIN: [Self; 2] = [Self::TaggedKeys, Self::FullScan];

    /// Collects raw URL candidates in document order, duplicates included.
    #[must_use]
    pub fn collect(self, root: &ManifestNode) -> Vec<String> {
        let mut found = Vec::new();
        match self {
            Self::TaggedKeys => collect_tagged(root, None, &mut found),
            Self::FullScan => collect_all(root, &mut found),
        }
        found
    }
}

/// Discovers the ordered, deduplicated URL list of a manifest.
#[must_use]
#[instrument(skip(manifest))]
pub fn extract_urls(manifest: &Manifest) -> Vec<String> {
    let mut candidates = Vec::new();
    for strategy in ExtractionStrategy::CHAIN {
        candidates = strategy.collect(manifest.root());
        debug!(?strategy, candidates = candidates.len(), "extraction pass");
        if !candidates.is_empty() {
            break;
        }
    }

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Finds URL-shaped substrings inside a block of text.
#[must_use]
pub fn find_url_substrings(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str())
        .inspect(|url| trace!(url, "found URL candidate"))
        .map(str::to_string)
        .collect()
}

fn is_tagged_key(key: &str, parent_key: Option<&str>) -> bool {
    TAGGED_KEYS.contains(&key)
        || (key == DATA_SECTION_PATHS_KEY && parent_key == Some(DATA_SECTION_KEY))
}

fn collect_tagged(node: &ManifestNode, parent_key: Option<&str>, found: &mut Vec<String>) {
    match node {
        ManifestNode::Mapping(entries) => {
            for (key, value) in entries {
                if is_tagged_key(key, parent_key) {
                    collect_all(value, found);
                }
                collect_tagged(value, Some(key), found);
            }
        }
        ManifestNode::Sequence(items) => {
            for item in items {
                collect_tagged(item, None, found);
            }
        }
        ManifestNode::Text(_) | ManifestNode::Other => {}
    }
}

fn collect_all(node: &ManifestNode, found: &mut Vec<String>) {
    match node {
        ManifestNode::Mapping(entries) => {
            for (_, value) in entries {
                collect_all(value, found);
            }
        }
        ManifestNode::Sequence(items) => {
            for item in items {
                collect_all(item, found);
            }
        }
        ManifestNode::Text(text) => found.extend(find_url_substrings(text)),
        ManifestNode::Other => {}
    }
}
