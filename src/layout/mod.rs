//! Mapping of remote URLs and script tokens onto the local data root.
//!
//! Every tool in this crate (download engine, script synthesizer, target
//! verifier) derives local paths through this module, using the same
//! [`LayoutConfig`] value. Two tools configured identically always agree on
//! where a given URL lives on disk.
//!
//! # Example
//!
//! ```
//! use datamirror_core::layout::{IncludePrefixes, LayoutConfig, normalize_url};
//!
//! let config = LayoutConfig::new("/data", "/preprocessed/", IncludePrefixes::default());
//! let rel = normalize_url("https://host/preprocessed/arxiv/part-0.npy", &config);
//! assert_eq!(rel.as_str(), "arxiv/part-0.npy");
//! ```

mod include;
mod normalize;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use include::IncludePrefixes;
pub use normalize::{DATA_ROOT_VAR, normalize, normalize_token, normalize_url};

/// Canonical slash-separated path below the data root.
///
/// Never starts with `/` and never contains empty, `.` or `..` segments.
/// Only the normalizer constructs values of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    /// Builds a canonical path from raw slash-separated text.
    pub(crate) fn from_raw(raw: &str) -> Self {
        let joined = raw
            .split('/')
            .filter(|segment| !matches!(*segment, "" | "." | ".."))
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the parent directory part, or `None` for a top-level entry.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(parent, _)| parent)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Layout settings threaded into every normalizer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    data_root: PathBuf,
    trim_prefix: String,
    include: IncludePrefixes,
}

impl LayoutConfig {
    /// Creates a layout rooted at `data_root`.
    ///
    /// `trim_prefix` is stored slash-stripped; an empty prefix keeps full URL paths.
    pub fn new(
        data_root: impl Into<PathBuf>,
        trim_prefix: impl AsRef<str>,
        include: IncludePrefixes,
    ) -> Self {
        Self {
            data_root: data_root.into(),
            trim_prefix: trim_prefix.as_ref().trim_start_matches('/').to_string(),
            include,
        }
    }

    /// The local directory all relative paths resolve under.
    #[must_use]
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// The slash-stripped URL path prefix removed before mapping.
    #[must_use]
    pub fn trim_prefix(&self) -> &str {
        &self.trim_prefix
    }

    /// The include filter.
    #[must_use]
    pub fn include(&self) -> &IncludePrefixes {
        &self.include
    }

    /// Returns true when `rel` passes the include filter.
    #[must_use]
    pub fn includes(&self, rel: &RelativePath) -> bool {
        self.include.matches(rel)
    }

    /// Resolves `rel` to its absolute location under the data root.
    #[must_use]
    pub fn absolute_path(&self, rel: &RelativePath) -> PathBuf {
        rel.as_str()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.data_root.clone(), |acc, segment| acc.join(segment))
    }
}
