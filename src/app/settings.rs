//! Merges CLI flags over file configuration over built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use datamirror_core::download::{
    CONNECT_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_WORKERS, HttpTimeouts, PROBE_TIMEOUT_SECS,
    READ_TIMEOUT_SECS,
};
use datamirror_core::layout::{IncludePrefixes, LayoutConfig};

use crate::app::config::FileConfig;
use crate::cli::{FetchArgs, LayoutArgs};

/// Raised when neither `--data-dir` nor the config file names a data root.
#[derive(Debug, thiserror::Error)]
#[error("no data directory: pass --data-dir or set data_dir in the config file")]
pub(crate) struct DataRootMissing;

/// Engine settings for `fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchSettings {
    pub(crate) workers: usize,
    pub(crate) max_attempts: u32,
    pub(crate) probe_timeout: Duration,
    pub(crate) timeouts: HttpTimeouts,
}

/// Include prefixes from the CLI, or from the config file when none were given.
pub(crate) fn include_prefixes(cli: &[String], config: Option<&FileConfig>) -> IncludePrefixes {
    if cli.is_empty() {
        config.map_or_else(IncludePrefixes::default, |c| {
            IncludePrefixes::parse(&c.include_prefix)
        })
    } else {
        IncludePrefixes::parse(cli)
    }
}

/// Builds the layout for commands that read a manifest.
pub(crate) fn layout_config(args: &LayoutArgs, config: Option<&FileConfig>) -> Result<LayoutConfig> {
    let data_root = args
        .data_dir
        .clone()
        .or_else(|| config.and_then(|c| c.data_dir.clone()))
        .ok_or(DataRootMissing)?;
    let data_root = absolute(&data_root)?;

    let trim_prefix = args
        .trim_prefix
        .clone()
        .or_else(|| config.and_then(|c| c.trim_prefix.clone()))
        .unwrap_or_default();

    Ok(LayoutConfig::new(
        data_root,
        trim_prefix,
        include_prefixes(&args.include_prefix, config),
    ))
}

pub(crate) fn fetch_settings(args: &FetchArgs, config: Option<&FileConfig>) -> FetchSettings {
    let workers = args
        .workers
        .map(usize::from)
        .or_else(|| config.and_then(|c| c.workers))
        .unwrap_or(DEFAULT_WORKERS);
    let max_attempts = args
        .max_attempts
        .or_else(|| config.and_then(|c| c.max_attempts))
        .unwrap_or(DEFAULT_MAX_ATTEMPTS);
    let secs = |value: Option<u64>, default: u64| Duration::from_secs(value.unwrap_or(default));

    FetchSettings {
        workers,
        max_attempts,
        probe_timeout: secs(config.and_then(|c| c.probe_timeout_secs), PROBE_TIMEOUT_SECS),
        timeouts: HttpTimeouts {
            connect: secs(config.and_then(|c| c.connect_timeout_secs), CONNECT_TIMEOUT_SECS),
            read: secs(config.and_then(|c| c.read_timeout_secs), READ_TIMEOUT_SECS),
        },
    }
}

/// Expands a leading `~` and makes `path` absolute.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    let expanded = match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    };
    std::path::absolute(&expanded)
        .with_context(|| format!("cannot resolve path {}", expanded.display()))
}
