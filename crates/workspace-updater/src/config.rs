//! Launcher configuration.
//!
//! Settings live in `launcher.toml` next to the launcher executable. Every
//! field has a default, so a missing file (or a missing section) is fine.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpdateError};

/// File name of the settings file inside the application directory.
pub const SETTINGS_FILE: &str = "launcher.toml";

/// How control is passed to the installer once the download succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffMode {
    /// Spawn the installer directly and exit.
    #[default]
    Direct,
    /// Spawn the helper, which waits out the launcher before starting the installer.
    Helper,
}

impl HandoffMode {
    /// Get a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Helper => "helper",
        }
    }
}

impl fmt::Display for HandoffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Top-level launcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Display name of the application.
    pub app_name: String,
    /// Main application executable, relative to the application directory.
    pub main_executable: String,
    /// Version marker file, relative to the application directory.
    pub version_file: String,
    /// Release feed settings.
    pub feed: FeedSettings,
    /// Download settings.
    pub download: DownloadSettings,
    /// Installer and handoff settings.
    pub installer: InstallerSettings,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            app_name: "Workspace".to_string(),
            main_executable: format!("workspace{}", std::env::consts::EXE_SUFFIX),
            version_file: "version.txt".to_string(),
            feed: FeedSettings::default(),
            download: DownloadSettings::default(),
            installer: InstallerSettings::default(),
        }
    }
}

impl LauncherSettings {
    /// Path of the settings file for the given application directory.
    #[must_use]
    pub fn default_path(app_dir: &Path) -> PathBuf {
        app_dir.join(SETTINGS_FILE)
    }

    /// Load settings from a TOML file.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(UpdateError::Config(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let settings = toml::from_str(&content)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize the settings as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| UpdateError::Config(e.to_string()))
    }
}

/// Release feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Base URL of the GitHub-compatible API.
    pub api_base_url: String,
    /// Repository in `owner/name` form.
    pub repository: String,
    /// Timeout for the release metadata request.
    pub check_timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            repository: "wmtogether/chats".to_string(),
            check_timeout_secs: 5,
        }
    }
}

impl FeedSettings {
    /// URL of the latest-release endpoint.
    #[must_use]
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/releases/latest",
            self.api_base_url.trim_end_matches('/'),
            self.repository
        )
    }

    /// Timeout for the release check.
    #[must_use]
    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }
}

/// Download settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Connect timeout for the download request.
    pub connect_timeout_secs: u64,
    /// Longest wait for the next chunk of the body. A peer that stalls for
    /// longer fails the download.
    pub read_timeout_secs: u64,
    /// Size of each read/write chunk in bytes.
    pub chunk_size: usize,
    /// Directory the installer is saved to. Defaults to the OS temp directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Presenter poll interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            user_agent: "Workspace-Launcher/1.0".to_string(),
            connect_timeout_secs: 60,
            read_timeout_secs: 60,
            chunk_size: 8192,
            directory: None,
            poll_interval_ms: 50,
        }
    }
}

impl DownloadSettings {
    /// Directory the installer is written to.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Connect timeout for the download request.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Per-read timeout. Never zero.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs.max(1))
    }

    /// Presenter poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Installer and handoff settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    /// Extension that identifies the installer asset.
    pub extension: String,
    /// Arguments selecting a silent update-mode install.
    pub arguments: Vec<String>,
    /// Handoff shape.
    pub handoff: HandoffMode,
    /// Helper executable, relative to the application directory.
    pub helper_executable: String,
    /// Process name the helper force-terminates.
    pub launcher_process: String,
    /// Fallback delay used by the helper when no pid is available.
    pub settle_delay_ms: u64,
    /// Upper bound on waiting for the launcher to leave the process table.
    pub exit_timeout_secs: u64,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        let suffix = std::env::consts::EXE_SUFFIX;
        Self {
            extension: ".exe".to_string(),
            arguments: vec!["/UPDATE".to_string(), "/SILENT".to_string()],
            handoff: HandoffMode::Direct,
            helper_executable: format!("updater{suffix}"),
            launcher_process: format!("launcher{suffix}"),
            settle_delay_ms: 1000,
            exit_timeout_secs: 10,
        }
    }
}

impl InstallerSettings {
    /// Fallback settle delay.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Bound on waiting for process exit.
    #[must_use]
    pub fn exit_timeout(&self) -> Duration {
        Duration::from_secs(self.exit_timeout_secs)
    }
}
