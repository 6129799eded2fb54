//! Manifest documents and URL discovery.
//!
//! A manifest is any nested mapping/sequence document (YAML or JSON) that
//! mentions the remote files of a dataset somewhere inside it. The document
//! is loaded once into an ordered [`ManifestNode`] tree and never mutated.
//!
//! # Example
//!
//! ```
//! use datamirror_core::manifest::{Manifest, extract_urls};
//!
//! let manifest = Manifest::from_yaml_str(
//!     "data:\n  data_paths:\n    - https://h/p/a/x\n    - https://h/p/a/x\n",
//! ).unwrap();
//! assert_eq!(extract_urls(&manifest), vec!["https://h/p/a/x".to_string()]);
//! ```

mod error;
mod extract;

use std::path::Path;

use tracing::{debug, instrument};

pub use error::ManifestError;
pub use extract::{ExtractionStrategy, extract_urls, find_url_substrings};

/// One node of a loaded manifest tree.
///
/// Mapping entries keep document order. Keys are held in their string form.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestNode {
    /// Key/value mapping.
    Mapping(Vec<(String, ManifestNode)>),
    /// Ordered sequence.
    Sequence(Vec<ManifestNode>),
    /// String scalar; the only kind of value scanned for URLs.
    Text(String),
    /// Null, boolean or numeric scalar.
    Other,
}

impl From<serde_yaml::Value> for ManifestNode {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Mapping(mapping) => Self::Mapping(
                mapping
                    .into_iter()
                    .map(|(key, value)| (yaml_key_string(&key), Self::from(value)))
                    .collect(),
            ),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::String(text) => Self::Text(text),
            Value::Tagged(tagged) => Self::from(tagged.value),
            Value::Null | Value::Bool(_) | Value::Number(_) => Self::Other,
        }
    }
}

impl From<serde_json::Value> for ManifestNode {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::String(text) => Self::Text(text),
            Value::Null | Value::Bool(_) | Value::Number(_) => Self::Other,
        }
    }
}

fn yaml_key_string(key: &serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match key {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Tagged(tagged) => yaml_key_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => String::new(),
    }
}

/// A loaded, read-only manifest document.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    root: ManifestNode,
}

impl Manifest {
    /// Wraps an already-built tree.
    #[must_use]
    pub fn new(root: ManifestNode) -> Self {
        Self { root }
    }

    /// Loads a manifest from disk.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NotFound`] when the path does not exist,
    /// [`ManifestError::Io`] when it cannot be read, and
    /// [`ManifestError::Parse`] when the content is malformed.
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::not_found(path));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let manifest = if is_json {
            serde_json::from_str::<serde_json::Value>(&raw)
                .map(|value| Self::new(ManifestNode::from(value)))
                .map_err(|e| ManifestError::parse(path, e.to_string()))?
        } else {
            Self::from_yaml_str(&raw).map_err(|e| ManifestError::parse(path, e.to_string()))?
        };

        debug!(json = is_json, "manifest loaded");
        Ok(manifest)
    }

    /// Parses a YAML (or JSON, which YAML accepts) document.
    ///
    /// # Errors
    ///
    /// Returns the YAML parser error for malformed input.
    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        let value: serde_yaml::Value = serde_yaml::from_str(raw)?;
        Ok(Self::new(ManifestNode::from(value)))
    }

    /// The root node of the document.
    #[must_use]
    pub fn root(&self) -> &ManifestNode {
        &self.root
    }
}
