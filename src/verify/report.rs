//! Verification results.

use std::path::PathBuf;

use serde::Serialize;

use crate::layout::RelativePath;

/// A destination a script is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Normalized path below the data root.
    pub relative: RelativePath,
    /// `relative` joined onto the data root.
    pub absolute: PathBuf,
}

/// Existence report over a script's unique targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Data root the targets were resolved under.
    pub data_root: PathBuf,
    /// Number of unique targets checked.
    pub total: usize,
    /// Number of targets present as regular files.
    pub existing_count: usize,
    /// Number of targets not present.
    pub missing_count: usize,
    /// Missing targets, in script order.
    pub missing: Vec<Target>,
    /// Present targets, in script order.
    pub existing: Vec<Target>,
    /// The present target appearing last in the script, if any.
    pub last_existing: Option<Target>,
}

impl VerifyReport {
    /// Builds a report from `(target, exists)` pairs given in script order.
    pub fn from_checked(
        data_root: impl Into<PathBuf>,
        checked: impl IntoIterator<Item = (Target, bool)>,
    ) -> Self {
        let mut existing = Vec::new();
        let mut missing = Vec::new();
        for (target, exists) in checked {
            if exists {
                existing.push(target);
            } else {
                missing.push(target);
            }
        }

        Self {
            data_root: data_root.into(),
            total: existing.len() + missing.len(),
            existing_count: existing.len(),
            missing_count: missing.len(),
            last_existing: existing.last().cloned(),
            missing,
            existing,
        }
    }

    /// True when every target exists.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn target(rel: &str) -> Target {
        Target {
            relative: RelativePath::from_raw(rel),
            absolute: PathBuf::from("/d").join(rel),
        }
    }

    #[test]
    fn test_last_existing_follows_script_order() {
        let report = VerifyReport::from_checked(
            "/d",
            vec![
                (target("A"), false),
                (target("B"), true),
                (target("C"), false),
                (target("D"), true),
            ],
        );
        assert_eq!(report.total, 4);
        assert_eq!(report.existing_count, 2);
        assert_eq!(report.missing_count, 2);
        assert_eq!(report.last_existing, Some(target("D")));
        assert_eq!(report.missing, vec![target("A"), target("C")]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_no_existing_target_is_explicit() {
        let report = VerifyReport::from_checked("/d", vec![(target("A"), false)]);
        assert_eq!(report.last_existing, None);
        assert!(report.existing.is_empty());
    }

    #[test]
    fn test_report_serializes_relative_as_string() {
        let report = VerifyReport::from_checked("/d", vec![(target("a/x"), true)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["last_existing"]["relative"], "a/x");
        assert_eq!(json["missing_count"], 0);
    }
}
