//! Pass control to the downloaded installer.
//!
//! Both shapes are fire-and-forget: the launcher never waits on, or looks at
//! the exit of, what it spawns here.
//!
//! - **Direct**: the installer is started as-is and the launcher exits.
//! - **Helper**: the helper binary is started with the launcher's pid. It
//!   waits for the launcher to leave, terminates stragglers, then starts the
//!   installer, so nothing holds a lock on the files being replaced.

use std::path::{Path, PathBuf};

use crate::config::{HandoffMode, InstallerSettings};
use crate::error::Result;
use crate::process::ProcessControl;
use crate::steps::download::DownloadSnapshot;

/// Installer to run and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRequest {
    /// Downloaded installer.
    pub installer: PathBuf,
    /// Installer arguments, in order.
    pub args: Vec<String>,
}

impl HandoffRequest {
    /// Build a request, but only for a download that completed successfully.
    #[must_use]
    pub fn from_download(
        snapshot: &DownloadSnapshot,
        installer: PathBuf,
        args: Vec<String>,
    ) -> Option<Self> {
        (snapshot.completed && snapshot.success).then_some(Self { installer, args })
    }
}

/// Spawns the installer in the configured shape.
#[derive(Debug, Clone)]
pub struct ProcessHandoff {
    mode: HandoffMode,
    helper: PathBuf,
    launcher_process: String,
}

impl ProcessHandoff {
    /// Configure a handoff from installer settings.
    ///
    /// The helper executable is resolved relative to `app_dir`.
    #[must_use]
    pub fn new(settings: &InstallerSettings, app_dir: &Path) -> Self {
        Self {
            mode: settings.handoff,
            helper: app_dir.join(&settings.helper_executable),
            launcher_process: settings.launcher_process.clone(),
        }
    }

    /// Spawn the installer, or the helper that will spawn it.
    ///
    /// Returns the pid of the spawned process.
    pub fn hand_off(
        &self,
        processes: &dyn ProcessControl,
        request: &HandoffRequest,
    ) -> Result<u32> {
        tracing::info!(
            "Handing off to {} ({} mode)",
            request.installer.display(),
            self.mode
        );

        match self.mode {
            HandoffMode::Direct => {
                processes.spawn_detached(&request.installer, &request.args, None)
            }
            HandoffMode::Helper => {
                let args = self.helper_args(processes.current_pid(), request);
                processes.spawn_detached(&self.helper, &args, None)
            }
        }
    }

    /// Command line for the helper.
    #[must_use]
    pub fn helper_args(&self, launcher_pid: u32, request: &HandoffRequest) -> Vec<String> {
        let mut args = vec![
            "--wait-pid".to_string(),
            launcher_pid.to_string(),
            "--process-name".to_string(),
            self.launcher_process.clone(),
            "--".to_string(),
            request.installer.to_string_lossy().into_owned(),
        ];
        args.extend(request.args.iter().cloned());
        args
    }
}
