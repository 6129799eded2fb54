//! Optional file configuration at `$XDG_CONFIG_HOME/datamirror/config.toml`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

const CONFIG_DIR_NAME: &str = "datamirror";
const CONFIG_FILE_NAME: &str = "config.toml";

const WORKERS_RANGE: std::ops::RangeInclusive<usize> = 1..=256;
const ATTEMPTS_RANGE: std::ops::RangeInclusive<u32> = 1..=20;
const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;

/// Values read from the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) trim_prefix: Option<String>,
    #[serde(default)]
    pub(crate) include_prefix: Vec<String>,
    pub(crate) workers: Option<usize>,
    pub(crate) max_attempts: Option<u32>,
    pub(crate) probe_timeout_secs: Option<u64>,
    pub(crate) connect_timeout_secs: Option<u64>,
    pub(crate) read_timeout_secs: Option<u64>,
}

impl FileConfig {
    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(workers) = self.workers
            && !WORKERS_RANGE.contains(&workers)
        {
            bail!(
                "{}: workers must be between {} and {}, got {workers}",
                path.display(),
                WORKERS_RANGE.start(),
                WORKERS_RANGE.end()
            );
        }
        if let Some(attempts) = self.max_attempts
            && !ATTEMPTS_RANGE.contains(&attempts)
        {
            bail!(
                "{}: max_attempts must be between {} and {}, got {attempts}",
                path.display(),
                ATTEMPTS_RANGE.start(),
                ATTEMPTS_RANGE.end()
            );
        }
        for (key, value) in [
            ("probe_timeout_secs", self.probe_timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("read_timeout_secs", self.read_timeout_secs),
        ] {
            if let Some(secs) = value
                && !TIMEOUT_RANGE.contains(&secs)
            {
                bail!(
                    "{}: {key} must be between {} and {}, got {secs}",
                    path.display(),
                    TIMEOUT_RANGE.start(),
                    TIMEOUT_RANGE.end()
                );
            }
        }
        Ok(())
    }
}

/// Config file location from `XDG_CONFIG_HOME`, falling back to `HOME/.config`.
pub(crate) fn config_path_from(
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Option<PathBuf> {
    let base = xdg_config_home
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            home.filter(|value| !value.is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
        })?;
    Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Reads and validates `path`; a missing file is not an error.
pub(crate) fn load_file_config(path: &Path) -> Result<Option<FileConfig>> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: FileConfig = toml::from_str(&raw)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    config.validate(path)?;
    debug!(path = %path.display(), "config file loaded");
    Ok(Some(config))
}

/// Loads the config file from its default location, if any.
pub(crate) fn load_default_file_config() -> Result<Option<FileConfig>> {
    match config_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    ) {
        Some(path) => load_file_config(&path),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_config_path_prefers_xdg() {
        let path = config_path_from(Some("/xdg".into()), Some("/home/u".into())).unwrap();
        assert_eq!(path, PathBuf::from("/xdg/datamirror/config.toml"));
    }

    #[test]
    fn test_config_path_falls_back_to_home() {
        let path = config_path_from(Some("".into()), Some("/home/u".into())).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.config/datamirror/config.toml"));
        assert_eq!(config_path_from(None, None), None);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_file_config(&dir.path().join("absent.toml")).unwrap(), None);
    }

    #[test]
    fn test_full_config_parses() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
data_dir = "/srv/data"
trim_prefix = "/preprocessed/"
include_prefix = ["arxiv/", "web/"]
workers = 4
max_attempts = 3
probe_timeout_secs = 5
connect_timeout_secs = 10
read_timeout_secs = 120
"#,
        );
        let config = load_file_config(&path).unwrap().unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/data")));
        assert_eq!(config.trim_prefix.as_deref(), Some("/preprocessed/"));
        assert_eq!(config.include_prefix, vec!["arxiv/", "web/"]);
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.max_attempts, Some(3));
        assert_eq!(config.read_timeout_secs, Some(120));
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");
        assert_eq!(load_file_config(&path).unwrap(), Some(FileConfig::default()));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "concurrency = 4\n");
        let error = load_file_config(&path).unwrap_err();
        assert!(format!("{error:#}").contains("concurrency"), "got: {error:#}");
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let dir = TempDir::new().unwrap();
        for body in [
            "workers = 0\n",
            "workers = 257\n",
            "max_attempts = 21\n",
            "read_timeout_secs = 0\n",
            "probe_timeout_secs = 3601\n",
        ] {
            let path = write_config(&dir, body);
            assert!(load_file_config(&path).is_err(), "accepted: {body}");
        }
    }
}
