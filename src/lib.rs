//! Datamirror Core Library
//!
//! This library mirrors a dataset described by a manifest of remote URLs
//! into a local directory tree, and can describe or audit the same transfer
//! as an external `wget` script.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`layout`] - URL and script-token to local path mapping (shared by all tools)
//! - [`manifest`] - Manifest loading and URL discovery
//! - [`plan`] - Ordered, filtered, deduplicated item list
//! - [`download`] - Concurrent HTTP download engine with retry support
//! - [`script`] - `wget` script synthesis
//! - [`verify`] - Script target verification against the filesystem

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod layout;
pub mod manifest;
pub mod plan;
pub mod script;
pub mod verify;

mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use download::{
    DEFAULT_WORKERS, DownloadEngine, DownloadError, DownloadReport, DownloadResult,
    DownloadStatus, DownloadTask, EngineError, HttpClient, HttpTimeouts, RetryPolicy,
};
pub use layout::{IncludePrefixes, LayoutConfig, RelativePath, normalize};
pub use manifest::{Manifest, ManifestError, extract_urls};
pub use plan::{PlanError, PlannedItem, plan_items};
pub use script::{ScriptError, render_script, write_script};
pub use verify::{VerifyError, VerifyReport, verify_script};
