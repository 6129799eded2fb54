//! Completeness check of an external download script against the filesystem.
//!
//! Targets are read from the `-O` arguments of the script, normalized with
//! the same [`crate::layout`] rules as every other tool, deduplicated in
//! script order and tested for existence under the data root.
//!
//! # Example
//!
//! ```
//! use datamirror_core::layout::{IncludePrefixes, LayoutConfig};
//! use datamirror_core::verify::check_targets;
//!
//! let layout = LayoutConfig::new("/nonexistent-root", "", IncludePrefixes::default());
//! let tokens = vec!["$DATA_DIR/a/x".to_string(), "${DATA_DIR}/a/x".to_string()];
//! let report = check_targets(&tokens, &layout).unwrap();
//! assert_eq!(report.total, 1);
//! assert_eq!(report.last_existing, None);
//! ```

mod data_root;
mod error;
mod report;
mod scan;

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, instrument};

pub use data_root::{DataRootSource, ResolvedDataRoot, find_assignment, resolve_data_root};
pub use error::VerifyError;
pub use report::{Target, VerifyReport};
pub use scan::{OUTPUT_FLAG, scan_targets};

use crate::layout::{DATA_ROOT_VAR, IncludePrefixes, LayoutConfig, normalize_token};

/// Verifies the script at `script_path`.
///
/// The data root comes from `data_root_override`, then the `DATA_DIR`
/// environment variable, then the script itself.
///
/// # Errors
///
/// Returns [`VerifyError::InputNotFound`] for a missing script,
/// [`VerifyError::DataRootUnresolved`] when no data root is available,
/// [`VerifyError::DiscoveryEmpty`] when the script has no targets,
/// [`VerifyError::DiscoveryEmptyAfterFilter`] when `include` removes them all,
/// and [`VerifyError::Io`] when the script cannot be read.
#[instrument(skip(include), fields(script = %script_path.display()))]
pub fn verify_script(
    script_path: &Path,
    data_root_override: Option<&Path>,
    include: &IncludePrefixes,
) -> Result<VerifyReport, VerifyError> {
    if !script_path.exists() {
        return Err(VerifyError::InputNotFound {
            path: script_path.to_path_buf(),
        });
    }
    let script = std::fs::read_to_string(script_path).map_err(|source| VerifyError::Io {
        path: script_path.to_path_buf(),
        source,
    })?;

    let env_root = std::env::var(DATA_ROOT_VAR).ok();
    let root = resolve_data_root(data_root_override, env_root.as_deref(), &script).ok_or_else(
        || VerifyError::DataRootUnresolved {
            script: script_path.to_path_buf(),
        },
    )?;

    let tokens = scan_targets(&script);
    if tokens.is_empty() {
        return Err(VerifyError::DiscoveryEmpty {
            script: Some(script_path.to_path_buf()),
        });
    }
    debug!(tokens = tokens.len(), "targets scanned");

    let layout = LayoutConfig::new(root.path, "", include.clone());
    check_targets_in(Some(script_path), &tokens, &layout)
}

/// Normalizes, deduplicates, filters and checks raw `-O` tokens.
///
/// # Errors
///
/// Returns [`VerifyError::DiscoveryEmpty`] when no token names a usable
/// path, and [`VerifyError::DiscoveryEmptyAfterFilter`] when usable targets
/// exist but none survives the include filter.
pub fn check_targets(tokens: &[String], layout: &LayoutConfig) -> Result<VerifyReport, VerifyError> {
    check_targets_in(None, tokens, layout)
}

fn check_targets_in(
    script: Option<&Path>,
    tokens: &[String],
    layout: &LayoutConfig,
) -> Result<VerifyReport, VerifyError> {
    let mut seen = HashSet::new();
    let unique: Vec<_> = tokens
        .iter()
        .map(|token| normalize_token(token, layout))
        .filter(|relative| !relative.is_empty())
        .filter(|relative| seen.insert(relative.clone()))
        .collect();

    if unique.is_empty() {
        return Err(VerifyError::DiscoveryEmpty {
            script: script.map(Path::to_path_buf),
        });
    }

    let discovered = unique.len();
    let kept: Vec<_> = unique
        .into_iter()
        .filter(|relative| layout.includes(relative))
        .collect();
    if kept.is_empty() {
        return Err(VerifyError::DiscoveryEmptyAfterFilter { discovered });
    }

    let checked = kept.into_iter().map(|relative| {
        let absolute = layout.absolute_path(&relative);
        let exists = absolute.is_file();
        (Target { relative, absolute }, exists)
    });
    let report = VerifyReport::from_checked(layout.data_root(), checked);

    info!(
        total = report.total,
        existing = report.existing_count,
        missing = report.missing_count,
        "targets checked"
    );
    Ok(report)
}
