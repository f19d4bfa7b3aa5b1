//! Terminal progress display on `indicatif`.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::ProgressView;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {prefix:.bold} {msg}";
const BAR_TEMPLATE: &str =
    "{prefix:.bold} [{bar:40.cyan/blue}] {percent:>3}% {msg} ({bytes_per_sec}, {eta})";

/// Spinner while the size is unknown, then a byte bar.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    /// Start an indeterminate session drawn to stderr.
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self::with_bar(ProgressBar::new_spinner(), title)
    }

    /// A session that draws nothing.
    #[must_use]
    pub fn hidden(title: &str) -> Self {
        Self::with_bar(ProgressBar::hidden(), title)
    }

    fn with_bar(bar: ProgressBar, title: &str) -> Self {
        let style = ProgressStyle::with_template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_prefix(title.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl ProgressView for TerminalProgress {
    fn set_status(&mut self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    fn switch_to_determinate(&mut self, total: u64) {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .map(|style| style.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        self.bar.set_style(style);
        self.bar.set_length(total);
    }

    fn set_position(&mut self, position: u64) {
        self.bar.set_position(position);
    }

    fn close(&mut self) {
        self.bar.finish_and_clear();
    }
}
