//! Turns discovered URLs into the ordered item list shared by every tool.
//!
//! Both the download engine and the script synthesizer consume the output of
//! [`plan_items`], so the two can never disagree about which files exist or
//! where they go.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::layout::{LayoutConfig, RelativePath, normalize_url};

/// A kept URL and its normalized destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    /// Source URL.
    pub url: String,
    /// Destination below the data root.
    pub relative: RelativePath,
}

/// Reasons a plan comes out empty.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// No URLs were discovered at all.
    #[error("no URLs found in manifest")]
    DiscoveryEmpty,

    /// URLs were discovered but none matched the include prefixes.
    #[error("{discovered} URL(s) found but none match the include prefixes")]
    DiscoveryEmptyAfterFilter {
        /// How many URLs were discovered before filtering.
        discovered: usize,
    },
}

/// Normalizes, filters and deduplicates `urls` against `config`.
///
/// Order follows `urls`. When two URLs map to the same relative path the
/// first one wins. URLs whose path normalizes to nothing are dropped.
///
/// # Errors
///
/// Returns [`PlanError::DiscoveryEmpty`] for an empty input and
/// [`PlanError::DiscoveryEmptyAfterFilter`] when nothing survives filtering.
#[instrument(skip(urls, config), fields(urls = urls.len()))]
pub fn plan_items(urls: &[String], config: &LayoutConfig) -> Result<Vec<PlannedItem>, PlanError> {
    if urls.is_empty() {
        return Err(PlanError::DiscoveryEmpty);
    }

    let mut seen: HashSet<RelativePath> = HashSet::new();
    let mut items = Vec::new();
    for url in urls {
        let relative = normalize_url(url, config);
        if relative.is_empty() {
            warn!(url = %url, "URL has no usable path, skipping");
            continue;
        }
        if !config.includes(&relative) {
            continue;
        }
        if !seen.insert(relative.clone()) {
            warn!(url = %url, relative = %relative, "relative path already planned, skipping duplicate");
            continue;
        }
        items.push(PlannedItem {
            url: url.clone(),
            relative,
        });
    }

    debug!(kept = items.len(), "plan built");
    if items.is_empty() {
        return Err(PlanError::DiscoveryEmptyAfterFilter {
            discovered: urls.len(),
        });
    }
    Ok(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layout::IncludePrefixes;

    fn urls(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_plan_trims_and_keeps_order() {
        let config = LayoutConfig::new("/d", "/p/", IncludePrefixes::default());
        let items = plan_items(&urls(&["https://h/p/a/y", "https://h/p/a/x"]), &config).unwrap();
        let rels: Vec<&str> = items.iter().map(|i| i.relative.as_str()).collect();
        assert_eq!(rels, vec!["a/y", "a/x"]);
    }

    #[test]
    fn test_plan_filters_by_include_prefix() {
        let config = LayoutConfig::new("/d", "/p/", IncludePrefixes::parse(&["b/"]));
        let items = plan_items(&urls(&["https://h/p/a/x", "https://h/p/b/y"]), &config).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://h/p/b/y");
    }

    #[test]
    fn test_plan_dedups_colliding_relative_paths() {
        let config = LayoutConfig::new("/d", "", IncludePrefixes::default());
        let items = plan_items(
            &urls(&["https://mirror1/a/x", "https://mirror2/a/x", "https://mirror1/a/z"]),
            &config,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "https://mirror1/a/x");
        assert_eq!(items[1].relative.as_str(), "a/z");
    }

    #[test]
    fn test_plan_empty_input_is_discovery_empty() {
        let config = LayoutConfig::new("/d", "", IncludePrefixes::default());
        assert_eq!(plan_items(&[], &config), Err(PlanError::DiscoveryEmpty));
    }

    #[test]
    fn test_plan_all_filtered_is_distinct_error() {
        let config = LayoutConfig::new("/d", "", IncludePrefixes::parse(&["nope/"]));
        assert_eq!(
            plan_items(&urls(&["https://h/a/x"]), &config),
            Err(PlanError::DiscoveryEmptyAfterFilter { discovered: 1 })
        );
    }
}
