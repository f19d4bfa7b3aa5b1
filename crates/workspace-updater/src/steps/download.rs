//! Download the installer on a worker thread while publishing progress.
//!
//! The worker is the only writer of [`DownloadState`]; the presenter is the
//! only reader. Intermediate fields are best-effort and may be one poll stale.
//! The completion flag is the one synchronization point: it is published with
//! release ordering after the outcome is stored, so a reader that observes it
//! also observes the final outcome.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};

use reqwest::blocking::Client;

use crate::config::DownloadSettings;
use crate::error::{Result, UpdateError};
use crate::progress::progress_percent;

const MB: f64 = 1024.0 * 1024.0;

/// Error text recorded when a failure carries no message of its own.
const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Succeeded,
    Failed(String),
}

/// Progress record shared between the download worker and the presenter.
#[derive(Debug)]
pub struct DownloadState {
    total: AtomicU64,
    downloaded: AtomicU64,
    status: Mutex<String>,
    outcome: OnceLock<Outcome>,
    completed: AtomicBool,
}

impl Default for DownloadState {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadState {
    /// Creates an empty, not-yet-completed state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            downloaded: AtomicU64::new(0),
            status: Mutex::new("Initializing...".to_string()),
            outcome: OnceLock::new(),
            completed: AtomicBool::new(false),
        }
    }

    /// Whether the worker has finished, successfully or not.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Takes a point-in-time copy for display.
    #[must_use]
    pub fn snapshot(&self) -> DownloadSnapshot {
        let completed = self.is_completed();
        let (success, error) = match (completed, self.outcome.get()) {
            (true, Some(Outcome::Succeeded)) => (true, None),
            (true, Some(Outcome::Failed(msg))) => (false, Some(msg.clone())),
            _ => (false, None),
        };

        DownloadSnapshot {
            total: self.total.load(Ordering::Relaxed),
            downloaded: self.downloaded.load(Ordering::Relaxed),
            status: self
                .status
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            completed,
            success,
            error,
        }
    }

    /// Records the expected size. Only the first non-zero value sticks.
    pub(crate) fn set_total(&self, total: u64) -> bool {
        total > 0
            && self
                .total
                .compare_exchange(0, total, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
    }

    pub(crate) fn add_downloaded(&self, bytes: u64) {
        self.downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn set_status(&self, status: impl Into<String>) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status.into();
    }

    /// Stores the outcome and flips the completion flag.
    ///
    /// Returns `false` if the state was already completed.
    pub(crate) fn complete(&self, result: std::result::Result<(), String>) -> bool {
        let outcome = match result {
            Ok(()) => Outcome::Succeeded,
            Err(msg) if msg.trim().is_empty() => Outcome::Failed(UNKNOWN_ERROR.to_string()),
            Err(msg) => Outcome::Failed(msg),
        };

        if self.outcome.set(outcome).is_err() {
            return false;
        }
        let already = self.completed.swap(true, Ordering::AcqRel);
        debug_assert!(!already, "download state completed twice");
        !already
    }
}

/// Point-in-time view of a [`DownloadState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSnapshot {
    /// Expected size in bytes, 0 while unknown.
    pub total: u64,
    /// Bytes written so far.
    pub downloaded: u64,
    /// Human-readable status line.
    pub status: String,
    /// Whether the worker has finished.
    pub completed: bool,
    /// Whether the download succeeded. Only meaningful once completed.
    pub success: bool,
    /// Failure message. Only present once completed without success.
    pub error: Option<String>,
}

impl DownloadSnapshot {
    /// Progress percentage, or `None` while the total is unknown.
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        progress_percent(self.downloaded, self.total)
    }
}

/// Status line shown while transferring.
#[must_use]
pub fn status_text(downloaded: u64, total: u64) -> String {
    let mb = downloaded as f64 / MB;
    if total > 0 {
        format!("{mb:.1} MB / {:.1} MB", total as f64 / MB)
    } else {
        format!("Downloaded {mb:.1} MB")
    }
}

/// Format bytes as a human-readable string.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Completes the state as failed if the worker unwinds before finishing.
struct CompletionGuard<'a> {
    state: &'a DownloadState,
    finished: bool,
}

impl<'a> CompletionGuard<'a> {
    fn new(state: &'a DownloadState) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, result: std::result::Result<(), String>) -> bool {
        self.finished = true;
        let success = result.is_ok();
        self.state.complete(result);
        success
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state
                .complete(Err("download worker stopped unexpectedly".to_string()));
        }
    }
}

/// Streams a release asset to disk.
#[derive(Debug, Clone)]
pub struct DownloadManager {
    client: Client,
    chunk_size: usize,
}

impl DownloadManager {
    /// Creates a manager with the configured user agent and timeouts.
    pub fn new(settings: &DownloadSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.read_timeout())
            .build()
            .map_err(|e| UpdateError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            chunk_size: settings.chunk_size.max(1),
        })
    }

    /// Downloads `url` to `dest` on the calling thread.
    ///
    /// Always completes `state` exactly once as its final action. A partial
    /// file is left in place on failure.
    pub fn download(&self, url: &str, dest: &Path, state: &DownloadState) -> bool {
        let guard = CompletionGuard::new(state);

        let result = self.transfer(url, dest, state);
        match &result {
            Ok(bytes) => tracing::info!(
                "Download complete: {} written to {}",
                format_bytes(*bytes),
                dest.display()
            ),
            Err(e) => tracing::warn!("Download of {} failed: {e}", url),
        }

        guard.finish(result.map(|_| ()).map_err(|e| e.to_string()))
    }

    /// Runs [`download`](Self::download) on a dedicated worker thread.
    pub fn spawn(
        self,
        url: String,
        dest: PathBuf,
        state: Arc<DownloadState>,
    ) -> std::io::Result<JoinHandle<bool>> {
        thread::Builder::new()
            .name("download-worker".to_string())
            .spawn(move || self.download(&url, &dest, &state))
    }

    fn transfer(&self, url: &str, dest: &Path, state: &DownloadState) -> Result<u64> {
        tracing::info!("Starting download from {}", url);
        state.set_status("Requesting file...");

        let mut response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let total = response.content_length().unwrap_or(0);
        state.set_total(total);
        if total == 0 {
            tracing::debug!("No content length, progress is indeterminate");
        }

        let mut file = File::create(dest)?;
        let mut buf = vec![0u8; self.chunk_size];
        let mut downloaded: u64 = 0;

        loop {
            let read = match response.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(UpdateError::Network(e.to_string())),
            };

            file.write_all(&buf[..read])?;
            downloaded += read as u64;
            state.add_downloaded(read as u64);
            state.set_status(status_text(downloaded, total));

            tracing::trace!(
                "Downloaded {} / {}",
                format_bytes(downloaded),
                format_bytes(total)
            );
        }

        file.flush()?;
        Ok(downloaded)
    }
}
