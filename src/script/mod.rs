//! Rendering of a planned item list as a standalone `wget` shell script.
//!
//! The script mirrors exactly what the download engine would do for the same
//! plan: one block per item, written to `$DATA_DIR/<relative path>`. Values
//! placed inside double quotes are escaped so that a POSIX tokenizer (such as
//! the one used by [`crate::verify`]) recovers them byte for byte.
//!
//! # Example
//!
//! ```
//! use datamirror_core::layout::{IncludePrefixes, LayoutConfig};
//! use datamirror_core::plan::plan_items;
//! use datamirror_core::script::render_script;
//!
//! let layout = LayoutConfig::new("/data", "/p/", IncludePrefixes::default());
//! let items = plan_items(&["https://h/p/a/x".to_string()], &layout).unwrap();
//! let text = render_script(&items, layout.data_root()).unwrap();
//! assert!(text.contains(r#"-O "$DATA_DIR/a/x""#));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::layout::{DATA_ROOT_VAR, RelativePath};
use crate::plan::PlannedItem;

/// Default file name for a synthesized script.
pub const DEFAULT_SCRIPT_NAME: &str = "download_data.sh";

/// Per-file retry count passed to `wget -t`.
pub const FETCH_TRIES: u32 = 5;

/// Per-file network timeout passed to `wget --timeout`, in seconds.
pub const FETCH_TIMEOUT_SECS: u32 = 60;

/// Errors raised while producing a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The data root cannot be expressed as a shell word.
    #[error("data root cannot be shell-quoted: {path}")]
    UnquotableRoot {
        /// The offending data root.
        path: PathBuf,
    },

    /// Writing the script file failed.
    #[error("failed to write script {path}: {source}")]
    Io {
        /// Script path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// One rendered line of a synthesized script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    /// Fixed header text, emitted verbatim.
    Raw(String),
    /// Empty separator line.
    Blank,
    /// `# <text>` comment naming the source URL.
    Comment(String),
    /// Creates the parent directory of a destination.
    MakeParentDir(RelativePath),
    /// Resumable fetch of `url` into a destination.
    Fetch {
        /// Source URL.
        url: String,
        /// Destination below `$DATA_DIR`.
        relative: RelativePath,
    },
}

impl fmt::Display for ScriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(text) => f.write_str(text),
            Self::Blank => Ok(()),
            Self::Comment(text) => write!(f, "# {text}"),
            Self::MakeParentDir(relative) => write!(
                f,
                r#"mkdir -p "$(dirname "{}")""#,
                destination_word(relative)
            ),
            Self::Fetch { url, relative } => write!(
                f,
                r#"wget -c --retry-connrefused -t {FETCH_TRIES} --timeout={FETCH_TIMEOUT_SECS} "{}" -O "{}""#,
                escape_double_quoted(url),
                destination_word(relative)
            ),
        }
    }
}

/// `$DATA_DIR/<rel>` with the relative part escaped for double quotes.
fn destination_word(relative: &RelativePath) -> String {
    format!(
        "${DATA_ROOT_VAR}/{}",
        escape_double_quoted(relative.as_str())
    )
}

/// Escapes the characters that keep their meaning inside double quotes.
fn escape_double_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds the script as a sequence of lines.
///
/// # Errors
///
/// Returns [`ScriptError::UnquotableRoot`] when `data_root` contains a NUL byte.
pub fn script_lines(
    items: &[PlannedItem],
    data_root: &Path,
) -> Result<Vec<ScriptLine>, ScriptError> {
    let root_text = data_root.to_string_lossy();
    let quoted_root = shlex::try_quote(&root_text).map_err(|_| ScriptError::UnquotableRoot {
        path: data_root.to_path_buf(),
    })?;

    let mut lines: Vec<ScriptLine> = [
        "#!/usr/bin/env bash".to_string(),
        "set -Eeuo pipefail".to_string(),
        String::new(),
        "if ! command -v wget >/dev/null 2>&1; then".to_string(),
        r#"  echo "Error: wget is not installed." >&2"#.to_string(),
        "  exit 1".to_string(),
        "fi".to_string(),
        String::new(),
        format!("{DATA_ROOT_VAR}={quoted_root}"),
        format!(r#"echo "Saving to: ${DATA_ROOT_VAR}""#),
        format!(r#"mkdir -p "${DATA_ROOT_VAR}""#),
    ]
    .into_iter()
    .map(|text| {
        if text.is_empty() {
            ScriptLine::Blank
        } else {
            ScriptLine::Raw(text)
        }
    })
    .collect();

    for item in items {
        lines.push(ScriptLine::Blank);
        lines.push(ScriptLine::Comment(item.url.clone()));
        lines.push(ScriptLine::MakeParentDir(item.relative.clone()));
        lines.push(ScriptLine::Fetch {
            url: item.url.clone(),
            relative: item.relative.clone(),
        });
    }

    Ok(lines)
}

/// Renders the full script text, newline terminated.
///
/// # Errors
///
/// Returns [`ScriptError::UnquotableRoot`] when `data_root` contains a NUL byte.
#[instrument(skip(items), fields(items = items.len(), data_root = %data_root.display()))]
pub fn render_script(items: &[PlannedItem], data_root: &Path) -> Result<String, ScriptError> {
    let mut text = String::new();
    for line in script_lines(items, data_root)? {
        text.push_str(&line.to_string());
        text.push('\n');
    }
    debug!(bytes = text.len(), "script rendered");
    Ok(text)
}

/// Writes `text` to `path` and marks it executable.
///
/// # Errors
///
/// Returns [`ScriptError::Io`] when the file cannot be written or its
/// permissions cannot be changed.
#[instrument(skip(text), fields(path = %path.display()))]
pub fn write_script(path: &Path, text: &str) -> Result<(), ScriptError> {
    let io_err = |source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::write(path, text).map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path).map_err(io_err)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        std::fs::set_permissions(path, perms).map_err(io_err)?;
    }

    info!("script written");
    Ok(())
}
