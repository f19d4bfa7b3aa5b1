//! Subcommand implementations.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use workspace_updater::{
    HeadlessUi, LaunchReport, Launcher, LauncherSettings, LauncherUi, LocalVersion, NativeUi,
    ProcessControl, SystemProcesses, UpdateError, VersionResolver,
};

use crate::cli::RunArgs;

/// Resolve the application directory.
///
/// Defaults to the directory holding the launcher executable.
pub fn resolve_app_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    let exe = std::env::current_exe().context("locate launcher executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("launcher executable has no parent directory")
}

/// Load settings, falling back to defaults when the file is unusable.
pub fn load_settings(app_dir: &Path, config: Option<&Path>) -> LauncherSettings {
    let path = config.map_or_else(|| LauncherSettings::default_path(app_dir), Path::to_path_buf);
    match LauncherSettings::load_from(&path) {
        Ok(settings) => settings,
        Err(error) => {
            warn!("Ignoring settings file: {error}");
            LauncherSettings::default()
        }
    }
}

/// Which dialog backend a `run` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiBackend {
    /// Message boxes. `--yes` only skips the update prompt.
    Native { assume_yes: bool },
    /// Terminal only, selected by `--headless`.
    Headless { assume_yes: bool },
}

impl UiBackend {
    /// Backend for the given `run` flags.
    #[must_use]
    pub fn for_args(args: &RunArgs) -> Self {
        if args.headless {
            Self::Headless {
                assume_yes: args.yes,
            }
        } else {
            Self::Native {
                assume_yes: args.yes,
            }
        }
    }

    fn into_ui(self) -> Box<dyn LauncherUi> {
        match self {
            Self::Native { assume_yes } => Box::new(NativeUi::new().assume_yes(assume_yes)),
            Self::Headless { assume_yes } => Box::new(HeadlessUi::new(assume_yes)),
        }
    }
}

/// Run a launch session with system process control and the chosen UI.
pub fn run_launch(app_dir: &Path, settings: LauncherSettings, args: &RunArgs) -> i32 {
    let processes = SystemProcesses::new();
    let mut ui = UiBackend::for_args(args).into_ui();
    run_launch_with(app_dir, settings, args, &processes, ui.as_mut())
}

/// Run a launch session against the given process control and UI.
///
/// Returns the process exit code: 1 only when the application is missing.
pub fn run_launch_with(
    app_dir: &Path,
    mut settings: LauncherSettings,
    args: &RunArgs,
    processes: &dyn ProcessControl,
    ui: &mut dyn LauncherUi,
) -> i32 {
    if let Some(handoff) = args.handoff {
        settings.installer.handoff = handoff.into();
    }

    let result = Launcher::new(settings, app_dir, processes, ui)
        .skip_update_check(args.skip_update_check)
        .run();

    match result {
        Ok(report) => {
            log_report(&report);
            0
        }
        Err(error) => {
            tracing::error!("Launch failed: {error}");
            if error.is_fatal() { 1 } else { 0 }
        }
    }
}

fn log_report(report: &LaunchReport) {
    let path: Vec<&str> = report.states.iter().map(|s| s.label()).collect();
    info!("Session finished: {}", path.join(" -> "));
    if let Some(pid) = report.handoff_pid {
        info!("Installer handoff running as pid {pid}");
    }
    if let Some(pid) = report.main_app_pid {
        info!("Application running as pid {pid}");
    }
}

/// Outcome of `launcher check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    /// Installed version, or the sentinel.
    pub local: String,
    /// Latest published tag, when the feed answered.
    pub latest: Option<String>,
    /// Whether that tag would be offered.
    pub update_available: bool,
    /// Why the feed could not be read.
    pub error: Option<String>,
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Local version:    {}", self.local)?;
        match (&self.latest, &self.error) {
            (Some(latest), _) => writeln!(f, "Latest release:   {latest}")?,
            (None, Some(error)) => writeln!(f, "Latest release:   unavailable ({error})")?,
            (None, None) => writeln!(f, "Latest release:   same as local")?,
        }
        write!(
            f,
            "Update available: {}",
            if self.update_available { "yes" } else { "no" }
        )
    }
}

/// Compare the local version with the feed without side effects.
pub fn run_check(app_dir: &Path, settings: &LauncherSettings) -> Result<CheckSummary> {
    let local = LocalVersion::read(&app_dir.join(&settings.version_file));
    let resolver =
        VersionResolver::new(settings, local.clone()).context("create release feed client")?;

    let summary = match resolver.try_check() {
        Ok(Some(release)) => CheckSummary {
            local: local.to_string(),
            latest: Some(release.tag),
            update_available: true,
            error: None,
        },
        Ok(None) => CheckSummary {
            local: local.to_string(),
            latest: None,
            update_available: false,
            error: None,
        },
        Err(error) => CheckSummary {
            local: local.to_string(),
            latest: None,
            update_available: false,
            error: Some(describe(&error)),
        },
    };
    Ok(summary)
}

fn describe(error: &UpdateError) -> String {
    match error {
        UpdateError::HttpStatus { status, .. } => format!("HTTP {status}"),
        other => other.to_string(),
    }
}

/// Render the effective settings.
pub fn run_config(settings: &LauncherSettings) -> Result<String> {
    settings.to_toml().context("serialize settings")
}
