//! HTTP client wrapper for probing and downloading files.
//!
//! This module provides the `HttpClient` struct which handles size probes and
//! streaming downloads with proper timeout configuration and error handling.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, RETRY_AFTER};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// Connection and read timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Time allowed to establish a connection.
    pub connect: Duration,
    /// Time allowed between received chunks.
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read: Duration::from_secs(READ_TIMEOUT_SECS),
        }
    }
}

/// HTTP client for probing and downloading files with streaming support.
///
/// This client is designed to be created once and shared by every task of a
/// run, taking advantage of connection pooling. Cloning is cheap.
///
/// # Example
///
/// ```no_run
/// use datamirror_core::download::{HttpClient, HttpTimeouts};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(HttpTimeouts::default())?;
/// let bytes = client
///     .download_to_path("https://example.com/a/x.npy", Path::new("/data/a/x.npy"))
///     .await?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with the given timeouts.
    ///
    /// Transparent decompression stays off so written byte counts can be
    /// compared with `Content-Length`.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error when the TLS backend or system
    /// configuration cannot be initialized.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .user_agent(user_agent::default_download_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Asks the server for the size of `url` with a `HEAD` request.
    ///
    /// Returns `None` when the request fails, times out, answers with a
    /// non-success status, or carries no parseable `Content-Length`. Callers
    /// treat `None` as "cannot confirm completeness".
    #[instrument(skip(self), fields(url = %url))]
    pub async fn probe_size(&self, url: &str, timeout: Duration) -> Option<u64> {
        let response = match self.client.head(url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(error) => {
                debug!(error = %error, "size probe failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "size probe rejected");
            return None;
        }

        // `Response::content_length` reports the (empty) body size for HEAD.
        let size = header_content_length(&response);
        debug!(size = ?size, "size probe answered");
        size
    }

    /// Downloads `url` into `dest`, replacing any existing file.
    ///
    /// The parent directory must already exist. On any error the partially
    /// written file is removed.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - Writing to disk fails
    /// - The body length differs from the advertised `Content-Length`
    #[must_use = "download result contains the number of bytes written"]
    #[instrument(skip(self, dest), fields(url = %url, dest = %dest.display()))]
    pub async fn download_to_path(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        debug!("starting download");

        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(std::string::ToString::to_string);
            return Err(DownloadError::http_status_with_retry_after(
                url,
                status.as_u16(),
                retry_after,
            ));
        }

        let advertised = header_content_length(&response);

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;

        let result = match stream_to_file(&mut file, response, url, dest).await {
            Ok(written) => match advertised {
                Some(expected) if expected != written => {
                    Err(DownloadError::integrity(dest, expected, written))
                }
                _ => Ok(written),
            },
            Err(error) => Err(error),
        };

        if result.is_err() {
            debug!(path = %dest.display(), "cleaning up partial file after error");
            drop(file);
            if let Err(e) = tokio::fs::remove_file(dest).await {
                debug!(path = %dest.display(), error = %e, "could not remove partial file");
            }
        }

        let written = result?;
        info!(path = %dest.display(), bytes = written, "download complete");
        Ok(written)
    }
}

fn header_content_length(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_reqwest(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
