//! `fetch`: download every planned item into the data directory.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use datamirror_core::download::{
    DownloadEngine, DownloadReport, DownloadStatus, DownloadTask, HttpClient, RetryPolicy,
};
use datamirror_core::manifest::{Manifest, extract_urls};
use datamirror_core::plan::plan_items;
use tracing::info;

use crate::ProcessExit;
use crate::app::config::FileConfig;
use crate::app::{exit_handler, settings, terminal};
use crate::cli::FetchArgs;

pub(crate) async fn run_fetch(
    args: &FetchArgs,
    file_config: Option<&FileConfig>,
    show_progress: bool,
) -> Result<ProcessExit> {
    let layout = settings::layout_config(&args.layout, file_config)?;
    let fetch = settings::fetch_settings(args, file_config);

    let manifest = Manifest::load(&args.layout.manifest)?;
    let urls = extract_urls(&manifest);
    let items = plan_items(&urls, &layout)?;
    info!(
        discovered = urls.len(),
        planned = items.len(),
        data_root = %layout.data_root().display(),
        "download plan ready"
    );

    std::fs::create_dir_all(layout.data_root()).with_context(|| {
        format!(
            "cannot create data directory {}",
            layout.data_root().display()
        )
    })?;

    let tasks = DownloadTask::from_plan(&items, &layout);
    let client = HttpClient::new(fetch.timeouts).context("failed to build HTTP client")?;
    let engine = DownloadEngine::new(
        fetch.workers,
        RetryPolicy::with_max_attempts(fetch.max_attempts),
    )
    .with_probe_timeout(fetch.probe_timeout);

    let bar = terminal::progress_bar(show_progress, tasks.len());
    let observer_bar = bar.clone();
    let report = engine
        .run_with_observer(tasks, &client, move |result| {
            observer_bar.set_message(result.task.relative.as_str().to_string());
            observer_bar.inc(1);
        })
        .await?;
    bar.finish_and_clear();

    print!("{}", format_summary(&report));
    Ok(exit_handler::outcome_for_fetch(&report))
}

/// Human summary printed after a run.
fn format_summary(report: &DownloadReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Downloaded: {}  |  Skipped: {}  |  Failed: {}  |  Bytes: {}",
        report.succeeded(),
        report.skipped(),
        report.failed(),
        report.bytes_written()
    );

    let failed: Vec<_> = report
        .results()
        .iter()
        .filter(|r| r.status == DownloadStatus::Failed)
        .collect();
    if !failed.is_empty() {
        let _ = writeln!(out, "\nFailed:");
        for result in failed {
            let _ = writeln!(
                out,
                "  {}  ({})",
                result.task.relative.as_str(),
                result.failure.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if !report.incomplete().is_empty() {
        let _ = writeln!(out, "\nMissing or empty after download:");
        for task in report.incomplete() {
            let _ = writeln!(out, "  {}", task.relative.as_str());
        }
    }

    if !report.is_complete() {
        let _ = writeln!(out, "\nIncomplete: {} item(s)", report.failure_tally());
    }
    out
}
