//! URL and script-token normalization into [`RelativePath`] values.

use std::path::{Component, Path, PathBuf};

use tracing::trace;
use url::Url;

use super::{LayoutConfig, RelativePath};

/// Shell variable naming the data root in synthesized and external scripts.
pub const DATA_ROOT_VAR: &str = "DATA_DIR";

/// Normalizes either a URL or a literal script token.
///
/// Inputs starting with `http://` or `https://` are treated as URLs and go
/// through [`normalize_url`]; everything else through [`normalize_token`].
#[must_use]
pub fn normalize(input: &str, config: &LayoutConfig) -> RelativePath {
    if is_http_url(input) {
        normalize_url(input, config)
    } else {
        normalize_token(input, config)
    }
}

/// Maps a URL to its relative path under the data root.
///
/// Scheme, host, query and fragment are discarded. The path is taken as
/// written in the URL: it is neither percent-encoded nor decoded, so
/// non-ASCII and reserved characters reach the disk unchanged. Dot segments
/// are resolved. The leading slash is removed, then the configured trim
/// prefix (compared as a plain string prefix) and any slash following it.
///
/// Never fails: unparseable URLs fall back to their raw path text, or to
/// their final segment when no path can be found.
#[must_use]
pub fn normalize_url(url: &str, config: &LayoutConfig) -> RelativePath {
    let path = match Url::parse(url) {
        Ok(_) => remove_dot_segments(raw_path_text(url)),
        Err(e) => {
            trace!(url, error = %e, "unparseable URL, using raw path");
            raw_url_path(url)
        }
    };

    let mut rel = path.trim_start_matches('/');
    let trim = config.trim_prefix();
    if !trim.is_empty()
        && let Some(rest) = rel.strip_prefix(trim)
    {
        rel = rest.trim_start_matches('/');
    }

    RelativePath::from_raw(rel)
}

/// Maps a literal output-path token from a download script.
///
/// - `$DATA_DIR/<rel>` and `${DATA_DIR}/<rel>` become `<rel>`.
/// - An absolute path under the data root becomes the remainder below the root.
/// - An absolute path outside the data root degrades to its final segment.
/// - Anything else is taken as an already-relative path.
///
/// No trim prefix is applied, so normalizing an already-normalized path is a no-op.
#[must_use]
pub fn normalize_token(token: &str, config: &LayoutConfig) -> RelativePath {
    if let Some(rest) = strip_root_placeholder(token) {
        return RelativePath::from_raw(rest);
    }

    let candidate = Path::new(token);
    if candidate.is_absolute() {
        let target = lexical_clean(candidate);
        let root = lexical_clean(config.data_root());
        return match target.strip_prefix(&root) {
            Ok(below) => RelativePath::from_raw(&path_to_slashes(below)),
            Err(_) => {
                trace!(token, root = %root.display(), "absolute target outside data root, keeping file name");
                RelativePath::from_raw(
                    &target
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                )
            }
        };
    }

    RelativePath::from_raw(token)
}

fn is_http_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

fn strip_root_placeholder(token: &str) -> Option<&str> {
    let braced = format!("${{{DATA_ROOT_VAR}}}");
    let bare = format!("${DATA_ROOT_VAR}");
    for marker in [braced.as_str(), bare.as_str()] {
        if let Some(rest) = token.strip_prefix(marker) {
            if rest.is_empty() {
                return Some(rest);
            }
            if let Some(rest) = rest.strip_prefix('/') {
                return Some(rest);
            }
        }
    }
    None
}

/// `scheme://authority` up to the first `?` or `#`, without the path.
fn authority_and_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme)
}

/// The path exactly as written, starting at the `/` after the authority.
fn raw_path_text(url: &str) -> &str {
    let rest = authority_and_path(url);
    rest.find('/').map_or("", |start| &rest[start..])
}

/// Resolves `.` and `..` segments; `..` never climbs above the start.
fn remove_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Best-effort path extraction for text the URL parser rejects.
fn raw_url_path(url: &str) -> String {
    let path = raw_path_text(url);
    if path.trim_matches('/').is_empty() {
        authority_and_path(url)
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
            .to_string()
    } else {
        path.to_string()
    }
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

fn path_to_slashes(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
