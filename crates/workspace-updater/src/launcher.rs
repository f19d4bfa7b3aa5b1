//! One launch session: check, maybe update, otherwise start the application.
//!
//! ```text
//! Idle -> CheckingVersion -> NoUpdate | UpdateOffered
//! UpdateOffered -> Declined | NoInstaller | Downloading
//! Downloading -> DownloadFailed | DownloadSucceeded
//! DownloadSucceeded -> HandoffSpawned -> Exit
//! DownloadSucceeded -> HandoffFailed
//! NoUpdate | Declined | NoInstaller | DownloadFailed | HandoffFailed -> LaunchMainApp -> Exit
//! ```
//!
//! Every path ends in `Exit`; nothing is retried. Only a missing main
//! executable is returned as an error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LauncherSettings;
use crate::error::{Result, UpdateError};
use crate::process::ProcessControl;
use crate::progress::ProgressPresenter;
use crate::release::{Asset, ReleaseInfo};
use crate::steps::check::VersionResolver;
use crate::steps::download::{DownloadManager, DownloadSnapshot, DownloadState};
use crate::steps::handoff::{HandoffRequest, ProcessHandoff};
use crate::steps::launch::launch_main_app;
use crate::ui::LauncherUi;
use crate::version::LocalVersion;

/// Title of the download progress session.
pub const PROGRESS_TITLE: &str = "Downloading Update...";

/// Where a launch session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    /// Nothing has happened yet.
    Idle,
    /// Querying the release feed.
    CheckingVersion,
    /// No different release, or the check failed.
    NoUpdate,
    /// A different release was found and offered.
    UpdateOffered,
    /// The user said no.
    Declined,
    /// The release has no installer asset.
    NoInstaller,
    /// Installer download in progress.
    Downloading,
    /// The download did not complete.
    DownloadFailed,
    /// The installer is on disk.
    DownloadSucceeded,
    /// The installer (or helper) could not be started.
    HandoffFailed,
    /// The installer (or helper) was started.
    HandoffSpawned,
    /// Starting the existing application.
    LaunchMainApp,
    /// Session finished.
    Exit,
}

impl LaunchState {
    /// Get a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CheckingVersion => "checking version",
            Self::NoUpdate => "no update",
            Self::UpdateOffered => "update offered",
            Self::Declined => "declined",
            Self::NoInstaller => "no installer",
            Self::Downloading => "downloading",
            Self::DownloadFailed => "download failed",
            Self::DownloadSucceeded => "download succeeded",
            Self::HandoffFailed => "handoff failed",
            Self::HandoffSpawned => "handoff spawned",
            Self::LaunchMainApp => "launch main app",
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What a session did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    /// Every state entered, in order, starting with `Idle`.
    pub states: Vec<LaunchState>,
    /// Local version used for the decision.
    pub local_version: Option<String>,
    /// Remote tag that was offered.
    pub offered_tag: Option<String>,
    /// Where the installer was written.
    pub installer: Option<PathBuf>,
    /// Final download snapshot, if a download ran.
    pub download: Option<DownloadSnapshot>,
    /// Pid of the spawned installer or helper.
    pub handoff_pid: Option<u32>,
    /// Pid of the started main application.
    pub main_app_pid: Option<u32>,
}

impl LaunchReport {
    fn new() -> Self {
        Self {
            states: vec![LaunchState::Idle],
            local_version: None,
            offered_tag: None,
            installer: None,
            download: None,
            handoff_pid: None,
            main_app_pid: None,
        }
    }

    /// Whether the session ended by handing off to the installer.
    #[must_use]
    pub fn handed_off(&self) -> bool {
        self.states.contains(&LaunchState::HandoffSpawned)
    }

    /// Whether the session passed through `state`.
    #[must_use]
    pub fn visited(&self, state: LaunchState) -> bool {
        self.states.contains(&state)
    }
}

/// Drives one launch session.
pub struct Launcher<'a> {
    settings: LauncherSettings,
    app_dir: PathBuf,
    processes: &'a dyn ProcessControl,
    ui: &'a mut dyn LauncherUi,
    handoff: ProcessHandoff,
    skip_update_check: bool,
    state: LaunchState,
    report: LaunchReport,
}

impl<'a> Launcher<'a> {
    /// Create a session for the application in `app_dir`.
    pub fn new(
        settings: LauncherSettings,
        app_dir: impl Into<PathBuf>,
        processes: &'a dyn ProcessControl,
        ui: &'a mut dyn LauncherUi,
    ) -> Self {
        let app_dir = app_dir.into();
        let handoff = ProcessHandoff::new(&settings.installer, &app_dir);
        Self {
            settings,
            app_dir,
            processes,
            ui,
            handoff,
            skip_update_check: false,
            state: LaunchState::Idle,
            report: LaunchReport::new(),
        }
    }

    /// Go straight to launching the application.
    #[must_use]
    pub fn skip_update_check(mut self, skip: bool) -> Self {
        self.skip_update_check = skip;
        self
    }

    /// Run the session to completion.
    ///
    /// Returns `Err` only for [`UpdateError::MainAppMissing`], after the user
    /// has been shown the error.
    pub fn run(mut self) -> Result<LaunchReport> {
        tracing::info!(
            "Starting {} launcher in {}",
            self.settings.app_name,
            self.app_dir.display()
        );

        if self.skip_update_check {
            tracing::info!("Update check skipped");
            return self.launch_main();
        }

        self.transition(LaunchState::CheckingVersion);
        let local = LocalVersion::read(&self.app_dir.join(&self.settings.version_file));
        self.report.local_version = Some(local.as_str().to_string());

        let Some(release) = self.check(local.clone()) else {
            self.transition(LaunchState::NoUpdate);
            return self.launch_main();
        };

        self.transition(LaunchState::UpdateOffered);
        self.report.offered_tag = Some(release.tag.clone());

        let message = format!(
            "A new version {} is available.\nCurrent version: {}\n\nUpdate now?",
            release.version(),
            local
        );
        if !self.ui.confirm("Update Available", &message) {
            self.transition(LaunchState::Declined);
            return self.launch_main();
        }

        let asset = match release.installer_asset(&self.settings.installer.extension) {
            Ok(asset) => asset.clone(),
            Err(e) => {
                self.ui.error("Error", &e.user_message());
                self.transition(LaunchState::NoInstaller);
                return self.launch_main();
            }
        };

        let installer = self.settings.download.download_dir().join(asset.file_name());
        self.report.installer = Some(installer.clone());

        self.transition(LaunchState::Downloading);
        let snapshot = self.download(&asset, &installer);
        self.report.download = Some(snapshot.clone());

        let Some(request) = HandoffRequest::from_download(
            &snapshot,
            installer,
            self.settings.installer.arguments.clone(),
        ) else {
            self.transition(LaunchState::DownloadFailed);
            let error = snapshot.error.as_deref().unwrap_or("unknown error");
            self.ui.error(
                "Update Failed",
                &format!("Could not download update.\n\n{error}"),
            );
            return self.launch_main();
        };

        self.transition(LaunchState::DownloadSucceeded);
        match self.handoff.hand_off(self.processes, &request) {
            Ok(pid) => {
                self.report.handoff_pid = Some(pid);
                self.transition(LaunchState::HandoffSpawned);
                self.transition(LaunchState::Exit);
                Ok(self.report)
            }
            Err(e) => {
                tracing::error!("Handoff failed: {e}");
                self.ui.error("Update Failed", "Failed to launch installer");
                self.transition(LaunchState::HandoffFailed);
                self.launch_main()
            }
        }
    }

    fn check(&self, local: LocalVersion) -> Option<ReleaseInfo> {
        match VersionResolver::new(&self.settings, local) {
            Ok(resolver) => resolver.check(),
            Err(e) => {
                tracing::warn!("Update check unavailable: {e}");
                None
            }
        }
    }

    /// Run the worker and the presenter, returning the final snapshot.
    fn download(&mut self, asset: &Asset, dest: &Path) -> DownloadSnapshot {
        let state = Arc::new(DownloadState::new());

        let manager = match DownloadManager::new(&self.settings.download) {
            Ok(manager) => manager,
            Err(e) => {
                state.complete(Err(e.to_string()));
                return state.snapshot();
            }
        };

        let worker = match manager.spawn(
            asset.download_url.clone(),
            dest.to_path_buf(),
            Arc::clone(&state),
        ) {
            Ok(worker) => worker,
            Err(e) => {
                state.complete(Err(format!("failed to start download worker: {e}")));
                return state.snapshot();
            }
        };

        let view = self.ui.progress_view(PROGRESS_TITLE);
        let snapshot =
            ProgressPresenter::new(view, self.settings.download.poll_interval()).run(&state);

        if worker.join().is_err() {
            tracing::error!("Download worker panicked");
        }
        snapshot
    }

    fn launch_main(mut self) -> Result<LaunchReport> {
        self.transition(LaunchState::LaunchMainApp);

        let result = launch_main_app(
            self.processes,
            &self.app_dir,
            &self.settings.main_executable,
        );
        match result {
            Ok(pid) => {
                self.report.main_app_pid = Some(pid);
                self.transition(LaunchState::Exit);
                Ok(self.report)
            }
            Err(e @ UpdateError::MainAppMissing(_)) => {
                self.ui.error(
                    "Error",
                    &format!("Application not found:\n{}", self.settings.main_executable),
                );
                self.transition(LaunchState::Exit);
                Err(e)
            }
            Err(e) => {
                self.ui.error("Error", &e.user_message());
                self.transition(LaunchState::Exit);
                Ok(self.report)
            }
        }
    }

    fn transition(&mut self, next: LaunchState) {
        tracing::info!("Launch state: {} -> {}", self.state, next);
        self.state = next;
        self.report.states.push(next);
    }
}
