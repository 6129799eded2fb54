//! Error types for target verification.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fatal conditions that stop a verification run.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The script file does not exist.
    #[error("script not found: {path}")]
    InputNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// No data root from the override, the environment or the script.
    #[error(
        "data root not provided, not set in ${var}, and no {var}= assignment found in {script}",
        var = crate::layout::DATA_ROOT_VAR
    )]
    DataRootUnresolved {
        /// Script that was scanned.
        script: PathBuf,
    },

    /// The script contains no usable output targets.
    #[error("no usable -O targets found{}", in_script(.script.as_deref()))]
    DiscoveryEmpty {
        /// Script that was scanned, when known.
        script: Option<PathBuf>,
    },

    /// Targets were found but none match the include prefixes.
    #[error("{discovered} target(s) found but none match the include prefixes")]
    DiscoveryEmptyAfterFilter {
        /// Unique targets before filtering.
        discovered: usize,
    },

    /// The script could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

fn in_script(script: Option<&Path>) -> String {
    script
        .map(|path| format!(" in {}", path.display()))
        .unwrap_or_default()
}
