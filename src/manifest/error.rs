//! Error types for manifest loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a manifest document.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest path does not exist.
    #[error("manifest not found: {path}")]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The manifest exists but could not be read.
    #[error("IO error reading manifest {path}: {source}")]
    Io {
        /// The manifest path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid YAML or JSON.
    #[error("failed to parse manifest {path}: {message}")]
    Parse {
        /// The manifest path.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

impl ManifestError {
    /// Creates a not-found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_names_path() {
        let msg = ManifestError::not_found("/tmp/missing.yaml").to_string();
        assert!(msg.contains("not found"), "Expected 'not found' in: {msg}");
        assert!(msg.contains("/tmp/missing.yaml"), "Expected path in: {msg}");
    }

    #[test]
    fn test_parse_display_includes_message() {
        let msg = ManifestError::parse("m.yaml", "unexpected end of stream").to_string();
        assert!(msg.contains("m.yaml"));
        assert!(msg.contains("unexpected end of stream"));
    }
}
