//! Polling presenter for a running download.
//!
//! The presenter is never signaled by the worker. It samples
//! [`DownloadState`] at a fixed interval and stops only once it has observed
//! the completion flag.

use std::thread;
use std::time::Duration;

use crate::steps::download::{DownloadSnapshot, DownloadState};
use crate::ui::ProgressView;

/// Percentage of `total` covered by `downloaded`, clamped to `[0, 100]`.
///
/// Returns `None` while `total` is 0, which means progress is indeterminate.
#[must_use]
pub fn progress_percent(downloaded: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some((downloaded as f64 / total as f64 * 100.0).clamp(0.0, 100.0))
}

/// Renders a [`DownloadState`] into a [`ProgressView`] until completion.
pub struct ProgressPresenter {
    view: Box<dyn ProgressView>,
    poll_interval: Duration,
    determinate: bool,
    last_status: String,
}

impl ProgressPresenter {
    /// Create a presenter that ticks every `poll_interval`.
    #[must_use]
    pub fn new(view: Box<dyn ProgressView>, poll_interval: Duration) -> Self {
        Self {
            view,
            poll_interval,
            determinate: false,
            last_status: String::new(),
        }
    }

    /// Block until the download completes, then close the view.
    ///
    /// Returns the snapshot in which completion was observed.
    pub fn run(mut self, state: &DownloadState) -> DownloadSnapshot {
        loop {
            let snapshot = state.snapshot();
            self.tick(&snapshot);

            if snapshot.completed {
                tracing::debug!(
                    "Presenter observed completion (success: {})",
                    snapshot.success
                );
                self.view.close();
                return snapshot;
            }

            thread::sleep(self.poll_interval);
        }
    }

    fn tick(&mut self, snapshot: &DownloadSnapshot) {
        if snapshot.status != self.last_status {
            self.view.set_status(&snapshot.status);
            self.last_status.clone_from(&snapshot.status);
        }

        if snapshot.percent().is_none() {
            return;
        }

        if !self.determinate {
            self.view.switch_to_determinate(snapshot.total);
            self.determinate = true;
        }
        self.view.set_position(snapshot.downloaded.min(snapshot.total));
    }
}
