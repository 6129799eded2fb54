//! Resolution of the data root a script writes into.
//!
//! Precedence: explicit override, then the `DATA_DIR` environment value,
//! then the first non-empty `DATA_DIR=` assignment in the script.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::layout::DATA_ROOT_VAR;

/// `DATA_DIR = value`, optionally prefixed by `export`.
#[allow(clippy::expect_used)]
static ASSIGNMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*(?:export\s+)?{DATA_ROOT_VAR}\s*=(.*)$"))
        .expect("assignment regex is valid") // Static pattern, safe to panic
});

/// Where a resolved data root came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRootSource {
    /// Explicit `--data-dir` style override.
    Override,
    /// The `DATA_DIR` environment variable.
    Environment,
    /// A `DATA_DIR=` line inside the script.
    Script,
}

/// An absolute data root and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDataRoot {
    /// Absolute, `~`-expanded path.
    pub path: PathBuf,
    /// Which input supplied it.
    pub source: DataRootSource,
}

/// Applies the override > environment > script precedence.
///
/// Empty environment values are ignored. Returns `None` when no source
/// provides a value.
#[must_use]
pub fn resolve_data_root(
    override_root: Option<&Path>,
    env_value: Option<&str>,
    script: &str,
) -> Option<ResolvedDataRoot> {
    let (raw, source) = if let Some(root) = override_root {
        (root.to_path_buf(), DataRootSource::Override)
    } else if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        (PathBuf::from(value), DataRootSource::Environment)
    } else {
        (
            PathBuf::from(find_assignment(script)?),
            DataRootSource::Script,
        )
    };

    let path = absolutize(&raw);
    debug!(path = %path.display(), ?source, "data root resolved");
    Some(ResolvedDataRoot { path, source })
}

/// Returns the value of the first non-empty `DATA_DIR=` assignment.
///
/// Quotes are removed with shell rules; an assignment that cannot be
/// tokenized has a single layer of matching quotes stripped instead.
#[must_use]
pub fn find_assignment(script: &str) -> Option<String> {
    script.lines().find_map(|line| {
        let captures = ASSIGNMENT_PATTERN.captures(line)?;
        let raw = captures.get(1)?.as_str().trim();
        let value = match shlex::split(raw) {
            Some(words) => words.join(" "),
            None => strip_matching_quotes(raw).to_string(),
        };
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn strip_matching_quotes(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    raw
}

/// Expands a leading `~` and makes the path absolute without touching the filesystem.
fn absolutize(raw: &Path) -> PathBuf {
    let expanded = match raw.strip_prefix("~") {
        Ok(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => raw.to_path_buf(),
        },
        Err(_) => raw.to_path_buf(),
    };
    std::path::absolute(&expanded).unwrap_or(expanded)
}
