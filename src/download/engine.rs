//! Download engine for concurrent file downloads with retry support.
//!
//! This module provides the `DownloadEngine` which runs a batch of
//! [`DownloadTask`]s using a semaphore-based concurrency control pattern,
//! skipping files that are already complete and retrying transient failures
//! with exponential backoff.
//!
//! # Example
//!
//! ```no_run
//! use datamirror_core::download::{DownloadEngine, DownloadTask, HttpClient, HttpTimeouts, RetryPolicy};
//! use datamirror_core::layout::{IncludePrefixes, LayoutConfig};
//! use datamirror_core::plan::plan_items;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = LayoutConfig::new("/data", "/p/", IncludePrefixes::default());
//! let items = plan_items(&["https://h/p/a/x".to_string()], &layout)?;
//! let engine = DownloadEngine::new(8, RetryPolicy::default());
//! let client = HttpClient::new(HttpTimeouts::default())?;
//! let report = engine.run(DownloadTask::from_plan(&items, &layout), &client).await?;
//! println!("failed or incomplete: {}", report.failure_tally());
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::constants::PROBE_TIMEOUT_SECS;
use super::retry::{RetryDecision, RetryPolicy, parse_retry_after};
use super::task::{DownloadResult, DownloadStatus, DownloadTask};
use super::{DownloadError, HttpClient};

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 8;

/// Error type for download engine operations.
///
/// Individual transfer failures are never surfaced here; they are recorded
/// in the [`DownloadReport`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Aggregate outcome of one engine run.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    results: Vec<DownloadResult>,
    incomplete: Vec<DownloadTask>,
}

impl DownloadReport {
    /// Per-task results, in task order.
    #[must_use]
    pub fn results(&self) -> &[DownloadResult] {
        &self.results
    }

    /// Tasks whose destination was missing or empty after the run.
    #[must_use]
    pub fn incomplete(&self) -> &[DownloadTask] {
        &self.incomplete
    }

    /// Number of tasks skipped because the local file was already complete.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(DownloadStatus::Skipped)
    }

    /// Number of tasks whose transfer succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(DownloadStatus::Succeeded)
    }

    /// Number of tasks whose transfer failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(DownloadStatus::Failed)
    }

    /// Total bytes transferred.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.results.iter().map(|r| r.bytes_written).sum()
    }

    /// Tasks that failed or ended up missing/empty on disk, each counted once.
    #[must_use]
    pub fn failure_tally(&self) -> usize {
        let incomplete: HashSet<&Path> = self
            .incomplete
            .iter()
            .map(|task| task.destination.as_path())
            .collect();
        self.results
            .iter()
            .filter(|r| {
                r.status == DownloadStatus::Failed
                    || incomplete.contains(r.task.destination.as_path())
            })
            .count()
    }

    /// True when every task ended with a non-empty file on disk.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure_tally() == 0
    }

    fn count(&self, status: DownloadStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Download engine for concurrent file downloads with retry support.
///
/// # Concurrency Model
///
/// - Each task runs in its own Tokio task and returns its own result
/// - A semaphore permit is acquired before starting each task
/// - Permits are released automatically when tasks complete (RAII)
/// - A panicking task becomes a failed result for that task only
///
/// # Retry Behavior
///
/// - Transient errors (network issues, 429/5xx, short bodies) are retried
///   with exponential backoff
/// - A `Retry-After` header replaces the computed backoff, capped at the
///   policy's maximum delay
/// - Permanent errors (other 4xx) fail immediately without retry
#[derive(Debug)]
pub struct DownloadEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured worker count.
    workers: usize,
    /// Retry policy for failed transfers.
    retry_policy: RetryPolicy,
    /// Timeout for the skip probe.
    probe_timeout: Duration,
}

impl DownloadEngine {
    /// Creates a new engine; `workers` below 1 is raised to 1.
    #[must_use]
    #[instrument(level = "debug", skip(retry_policy))]
    pub fn new(workers: usize, retry_policy: RetryPolicy) -> Self {
        let workers = workers.max(1);
        debug!(
            workers,
            max_attempts = retry_policy.max_attempts(),
            "creating download engine"
        );
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
            retry_policy,
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
        }
    }

    /// Overrides the skip-probe timeout.
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Runs every task to completion and returns the aggregate report.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    /// Individual download failures do NOT cause this method to error.
    pub async fn run(
        &self,
        tasks: Vec<DownloadTask>,
        client: &HttpClient,
    ) -> Result<DownloadReport, EngineError> {
        self.run_with_observer(tasks, client, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `observer` as each task finishes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip_all, fields(tasks = tasks.len(), workers = self.workers))]
    pub async fn run_with_observer<F>(
        &self,
        tasks: Vec<DownloadTask>,
        client: &HttpClient,
        observer: F,
    ) -> Result<DownloadReport, EngineError>
    where
        F: Fn(&DownloadResult) + Send + Sync + 'static,
    {
        let observer = Arc::new(observer);
        let mut handles = Vec::with_capacity(tasks.len());

        info!("starting downloads");

        for task in tasks {
            // Blocks while all workers are busy
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let client = client.clone();
            let retry_policy = self.retry_policy.clone();
            let probe_timeout = self.probe_timeout;
            let observer = Arc::clone(&observer);
            let spawned_task = task.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result =
                    process_task(spawned_task, &client, &retry_policy, probe_timeout).await;
                (*observer)(&result);
                result
            });
            handles.push((task, handle));
        }

        debug!(task_count = handles.len(), "waiting for downloads to complete");

        let mut results = Vec::with_capacity(handles.len());
        for (task, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(url = %task.url, error = %e, "download task panicked");
                    let result = DownloadResult::failed(task, 0, format!("task aborted: {e}"));
                    (*observer)(&result);
                    result
                }
            };
            results.push(result);
        }

        let incomplete = verify_destinations(&results).await;

        let report = DownloadReport {
            results,
            incomplete,
        };
        info!(
            succeeded = report.succeeded(),
            skipped = report.skipped(),
            failed = report.failed(),
            incomplete = report.incomplete().len(),
            bytes = report.bytes_written(),
            "downloads complete"
        );
        Ok(report)
    }
}

/// Runs one task: parent directory, skip probe, then the retry loop.
#[instrument(skip_all, fields(url = %task.url, relative = %task.relative))]
async fn process_task(
    task: DownloadTask,
    client: &HttpClient,
    policy: &RetryPolicy,
    probe_timeout: Duration,
) -> DownloadResult {
    if let Some(parent) = task.destination.parent()
        && let Err(e) = tokio::fs::create_dir_all(parent).await
    {
        let error = DownloadError::io(parent, e);
        warn!(error = %error, "cannot create destination directory");
        return DownloadResult::failed(task, 0, error.to_string());
    }

    if is_already_complete(&task, client, probe_timeout).await {
        info!("already complete, skipping");
        return DownloadResult::skipped(task);
    }

    match download_with_retry(client, &task, policy).await {
        Ok((bytes, attempts)) => {
            info!(bytes, attempts, "download succeeded");
            DownloadResult::succeeded(task, bytes, attempts)
        }
        Err((e, attempts)) => {
            warn!(error = %e, attempts, "download failed after all attempts");
            DownloadResult::failed(task, attempts, e.to_string())
        }
    }
}

/// Skip only when a local file exists and the server confirms the same size.
async fn is_already_complete(
    task: &DownloadTask,
    client: &HttpClient,
    probe_timeout: Duration,
) -> bool {
    let local_size = match tokio::fs::metadata(&task.destination).await {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => return false,
    };

    if task
        .expected_size
        .is_some_and(|expected| expected != local_size)
    {
        debug!(local_size, "local size differs from expected size");
        return false;
    }

    match client.probe_size(&task.url, probe_timeout).await {
        Some(remote_size) if remote_size == local_size => true,
        Some(remote_size) => {
            debug!(local_size, remote_size, "size mismatch, transferring");
            false
        }
        None => {
            debug!(local_size, "remote size unknown, transferring");
            false
        }
    }
}

/// Downloads a task with retry logic for transient errors.
///
/// # Returns
///
/// - `Ok((bytes, attempts))` on success
/// - `Err((DownloadError, attempts))` with the final error once the policy gives up
async fn download_with_retry(
    client: &HttpClient,
    task: &DownloadTask,
    policy: &RetryPolicy,
) -> Result<(u64, u32), (DownloadError, u32)> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        debug!(attempt, "attempting download");

        let outcome = match client.download_to_path(&task.url, &task.destination).await {
            Ok(bytes) => check_expected_size(task, bytes).await,
            Err(e) => Err(e),
        };

        let e = match outcome {
            Ok(bytes) => return Ok((bytes, attempt)),
            Err(e) => e,
        };

        let failure_type = policy.classify(&e);
        match policy.should_retry(failure_type, attempt) {
            RetryDecision::Retry {
                delay: backoff_delay,
                attempt: next_attempt,
            } => {
                let retry_after_delay = e
                    .retry_after()
                    .and_then(parse_retry_after)
                    .map(|delay| delay.min(policy.max_delay()));
                let delay = retry_after_delay.unwrap_or(backoff_delay);

                info!(
                    url = %task.url,
                    attempt = next_attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = delay.as_millis(),
                    using_retry_after = retry_after_delay.is_some(),
                    error = %e,
                    "retrying download"
                );
                tokio::time::sleep(delay).await;
            }
            RetryDecision::DoNotRetry { reason } => {
                debug!(url = %task.url, %reason, "not retrying download");
                return Err((e, attempt));
            }
        }
    }
}

async fn check_expected_size(task: &DownloadTask, bytes: u64) -> Result<u64, DownloadError> {
    match task.expected_size {
        Some(expected) if expected != bytes => {
            if let Err(e) = tokio::fs::remove_file(&task.destination).await {
                debug!(path = %task.destination.display(), error = %e, "could not remove mismatched file");
            }
            Err(DownloadError::integrity(
                task.destination.clone(),
                expected,
                bytes,
            ))
        }
        _ => Ok(bytes),
    }
}

/// Re-inspects every destination after the run.
async fn verify_destinations(results: &[DownloadResult]) -> Vec<DownloadTask> {
    let mut incomplete = Vec::new();
    for result in results {
        let present = tokio::fs::metadata(&result.task.destination)
            .await
            .is_ok_and(|meta| meta.is_file() && meta.len() > 0);
        if !present {
            debug!(relative = %result.task.relative, "destination missing or empty");
            incomplete.push(result.task.clone());
        }
    }
    incomplete
}
