//! Self-update orchestration for the Workspace launcher.
//!
//! On every launch the launcher checks the release feed, offers a different
//! release to the user, downloads its installer with live progress, and hands
//! off to the installer. Any failure short of a missing application falls
//! back to starting the installed application.
//!
//! # Architecture
//!
//! - [`VersionResolver`] - one blocking request to the latest-release endpoint
//! - [`DownloadManager`] - streams the installer to disk on a worker thread,
//!   publishing into a shared [`DownloadState`]
//! - [`ProgressPresenter`] - polls that state from the calling thread until it
//!   observes completion
//! - [`ProcessHandoff`] - starts the installer directly, or through the helper
//!   binary which runs [`run_helper`]
//! - [`launch_main_app`] - the fallback path
//!
//! [`Launcher`] ties the steps together. It reaches the user only through
//! [`LauncherUi`] and other processes only through [`ProcessControl`].
//!
//! # Example
//!
//! ```no_run
//! use workspace_updater::{HeadlessUi, Launcher, LauncherSettings, SystemProcesses};
//!
//! let settings = LauncherSettings::default();
//! let processes = SystemProcesses::new();
//! let mut ui = HeadlessUi::new(true);
//!
//! let report = Launcher::new(settings, "/opt/workspace", &processes, &mut ui).run()?;
//! println!("Visited: {:?}", report.states);
//! # Ok::<(), workspace_updater::UpdateError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod error;
pub mod release;
pub mod version;

// Individual steps
pub mod steps;

// GitHub API
pub mod github;

// Session and its seams
pub mod helper;
pub mod launcher;
pub mod process;
pub mod progress;
pub mod ui;

// Re-export main types for convenience
pub use config::{
    DownloadSettings, FeedSettings, HandoffMode, InstallerSettings, LauncherSettings,
    SETTINGS_FILE,
};
pub use error::{Result, UpdateError};
pub use helper::{HelperPlan, run_helper};
pub use launcher::{LaunchReport, LaunchState, Launcher};
pub use process::{ProcessControl, SystemProcesses};
pub use progress::{ProgressPresenter, progress_percent};
pub use release::{Asset, ReleaseInfo};
pub use ui::{HeadlessUi, LauncherUi, NativeUi, ProgressView, TerminalProgress};
pub use version::{LocalVersion, NO_VERSION, is_update_available, normalize_tag};

// Re-export step types
pub use steps::check::VersionResolver;
pub use steps::download::{
    DownloadManager, DownloadSnapshot, DownloadState, format_bytes, status_text,
};
pub use steps::handoff::{HandoffRequest, ProcessHandoff};
pub use steps::launch::launch_main_app;

/// Current version of the launcher.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
