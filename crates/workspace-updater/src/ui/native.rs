//! Dialog implementations of [`LauncherUi`].

use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use super::{LauncherUi, ProgressView, TerminalProgress};

/// Level of the update prompt. Message boxes have no question icon, so the
/// prompt uses the warning icon to stand apart from plain notices.
const CONFIRM_LEVEL: MessageLevel = MessageLevel::Warning;

/// Native message boxes, with download progress in the terminal.
///
/// Message boxes are the only native surface available here. Download
/// progress is drawn as a terminal bar, which stays hidden when the launcher
/// has no console; the session still blocks until the download completes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeUi {
    assume_yes: bool,
}

impl NativeUi {
    /// Create the native dialog backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept update prompts without showing them. Errors still get a dialog.
    #[must_use]
    pub fn assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }
}

impl LauncherUi for NativeUi {
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            tracing::info!("{title}: {} (answering yes)", message.replace('\n', " "));
            return true;
        }
        let result = MessageDialog::new()
            .set_level(CONFIRM_LEVEL)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::YesNo)
            .show();
        matches!(result, MessageDialogResult::Yes)
    }

    fn error(&mut self, title: &str, message: &str) {
        tracing::error!("{title}: {message}");
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }

    fn progress_view(&mut self, title: &str) -> Box<dyn ProgressView> {
        Box::new(TerminalProgress::new(title))
    }
}

/// Non-interactive backend for terminals and scripted runs.
///
/// Every confirmation gets the same preset answer.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessUi {
    assume_yes: bool,
    show_progress: bool,
}

impl HeadlessUi {
    /// Answer every confirmation with `assume_yes`.
    #[must_use]
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            show_progress: true,
        }
    }

    /// Draw no progress at all.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }
}

impl LauncherUi for HeadlessUi {
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        tracing::info!(
            "{title}: {} (answering {})",
            message.replace('\n', " "),
            if self.assume_yes { "yes" } else { "no" }
        );
        self.assume_yes
    }

    fn error(&mut self, title: &str, message: &str) {
        tracing::error!("{title}: {}", message.replace('\n', " "));
        eprintln!("{title}: {message}");
    }

    fn progress_view(&mut self, title: &str) -> Box<dyn ProgressView> {
        if self.show_progress {
            Box::new(TerminalProgress::new(title))
        } else {
            Box::new(TerminalProgress::hidden(title))
        }
    }
}
