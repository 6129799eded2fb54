//! Concurrent HTTP downloads into the data root.
//!
//! This module fetches [`DownloadTask`]s with bounded concurrency, streaming
//! bodies straight to disk.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Skip-if-complete via a `HEAD` size probe
//! - Declarative retry policy with exponential backoff and `Retry-After`
//! - Per-task fault isolation and a post-run completeness check
//! - Structured error types with full context

mod client;
mod constants;
mod engine;
mod error;
mod retry;
mod task;

pub use client::{HttpClient, HttpTimeouts};
pub use constants::{CONNECT_TIMEOUT_SECS, PROBE_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use engine::{DEFAULT_WORKERS, DownloadEngine, DownloadReport, EngineError};
pub use error::DownloadError;
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRYABLE_STATUSES, FailureType, RetryDecision, RetryPolicy,
    parse_retry_after,
};
pub use task::{DownloadResult, DownloadStatus, DownloadTask};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
