//! User-facing seams of the launch session.
//!
//! The session only talks to the user through [`LauncherUi`], so it can run
//! with native dialogs, headless in a terminal, or against a fake in tests.

mod native;
mod terminal;

pub use native::{HeadlessUi, NativeUi};
pub use terminal::TerminalProgress;

/// Dialogs the launch session needs.
pub trait LauncherUi {
    /// Ask a yes/no question. Returns `true` on "yes".
    fn confirm(&mut self, title: &str, message: &str) -> bool;

    /// Show an error and block until it is acknowledged.
    fn error(&mut self, title: &str, message: &str);

    /// Open a progress session for a download.
    fn progress_view(&mut self, title: &str) -> Box<dyn ProgressView>;
}

/// A progress display driven by the presenter.
///
/// Starts indeterminate. There is no cancel action; the view closes only when
/// the presenter calls [`close`](ProgressView::close).
pub trait ProgressView {
    /// Replace the status line.
    fn set_status(&mut self, status: &str);

    /// Leave indeterminate mode with the given maximum.
    fn switch_to_determinate(&mut self, total: u64);

    /// Move the indicator. Only called in determinate mode.
    fn set_position(&mut self, position: u64);

    /// Tear the session down.
    fn close(&mut self);
}
