//! Units of work consumed by the download engine and their outcomes.

use std::path::PathBuf;

use crate::layout::{LayoutConfig, RelativePath};
use crate::plan::PlannedItem;

/// One URL to fetch into one destination file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Source URL.
    pub url: String,
    /// Destination relative to the data root, used in reports.
    pub relative: RelativePath,
    /// Absolute destination path.
    pub destination: PathBuf,
    /// Size the finished file must have, when known in advance.
    pub expected_size: Option<u64>,
}

impl DownloadTask {
    /// Creates a task writing `url` to `relative` under `layout`'s data root.
    #[must_use]
    pub fn new(url: impl Into<String>, relative: RelativePath, layout: &LayoutConfig) -> Self {
        let destination = layout.absolute_path(&relative);
        Self {
            url: url.into(),
            relative,
            destination,
            expected_size: None,
        }
    }

    /// Requires the finished file to be exactly `bytes` long.
    #[must_use]
    pub fn with_expected_size(mut self, bytes: u64) -> Self {
        self.expected_size = Some(bytes);
        self
    }

    /// Builds one task per planned item, preserving order.
    #[must_use]
    pub fn from_plan(items: &[PlannedItem], layout: &LayoutConfig) -> Vec<Self> {
        items
            .iter()
            .map(|item| Self::new(item.url.clone(), item.relative.clone(), layout))
            .collect()
    }
}

/// Final state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Local file already matched the remote size; nothing transferred.
    Skipped,
    /// Transfer completed.
    Succeeded,
    /// Transfer failed after the retry policy gave up.
    Failed,
}

/// Outcome of one task.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// The task this result belongs to.
    pub task: DownloadTask,
    /// Final state.
    pub status: DownloadStatus,
    /// Bytes written by the successful attempt (0 when skipped or failed).
    pub bytes_written: u64,
    /// Transfer attempts made (0 when skipped).
    pub attempts: u32,
    /// Final error message for failed tasks.
    pub failure: Option<String>,
}

impl DownloadResult {
    pub(crate) fn skipped(task: DownloadTask) -> Self {
        Self {
            task,
            status: DownloadStatus::Skipped,
            bytes_written: 0,
            attempts: 0,
            failure: None,
        }
    }

    pub(crate) fn succeeded(task: DownloadTask, bytes_written: u64, attempts: u32) -> Self {
        Self {
            task,
            status: DownloadStatus::Succeeded,
            bytes_written,
            attempts,
            failure: None,
        }
    }

    pub(crate) fn failed(task: DownloadTask, attempts: u32, failure: impl Into<String>) -> Self {
        Self {
            task,
            status: DownloadStatus::Failed,
            bytes_written: 0,
            attempts,
            failure: Some(failure.into()),
        }
    }
}
