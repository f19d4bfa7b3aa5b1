//! Error types for the launcher update flow.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while checking, downloading, or handing off an update.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UpdateError {
    /// Network request failed (connect, read, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Numeric status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// GitHub API rate limit exceeded.
    #[error("GitHub API rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited {
        /// Seconds until the rate limit resets.
        retry_after: u64,
    },

    /// Failed to parse the release feed response.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The release has no asset with the platform installer extension.
    #[error("no installer ({extension}) found in release")]
    NoInstallerAsset {
        /// Installer extension that was searched for.
        extension: String,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(String),

    /// A child process could not be started.
    #[error("failed to start {program}: {message}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        message: String,
    },

    /// The main application executable does not exist.
    #[error("application not found: {}", .0.display())]
    MainAppMissing(PathBuf),

    /// Launcher configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl UpdateError {
    /// Returns a user-friendly message suitable for a dialog.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(msg) => format!("Could not reach the update server.\n{msg}"),
            Self::HttpStatus { status, .. } => {
                format!("The update server answered with HTTP {status}.")
            }
            Self::RateLimited { .. } => {
                "The update server is busy. Please try again later.".to_string()
            }
            Self::NoInstallerAsset { extension } => {
                format!("No installer ({extension}) found in release.")
            }
            Self::Spawn { program, .. } => format!("Failed to launch {program}"),
            Self::MainAppMissing(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("Application not found:\n{name}")
            }
            Self::JsonParse(_) | Self::Io(_) | Self::Config(_) => self.to_string(),
        }
    }

    /// Whether the launcher has no fallback left after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MainAppMissing(_))
    }
}

impl From<reqwest::Error> for UpdateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::JsonParse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for UpdateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for UpdateError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

impl From<toml::de::Error> for UpdateError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;
