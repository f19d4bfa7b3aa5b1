//! Local version marker and the update decision.
//!
//! The decision is a literal string comparison after stripping one optional
//! leading `v` from each side. A remote tag that is *older* than the local
//! marker still counts as an update.

use std::fmt;
use std::path::Path;

/// Sentinel used when no version marker could be read.
pub const NO_VERSION: &str = "0.0.0";

/// Strip one optional leading `v` from a version string.
#[must_use]
pub fn normalize_tag(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Whether `remote` should be offered as an update over `local`.
#[must_use]
pub fn is_update_available(local: &str, remote: &str) -> bool {
    normalize_tag(local) != normalize_tag(remote)
}

/// The installed version, read once per launch from the marker file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVersion {
    value: String,
}

impl LocalVersion {
    /// The "no version installed" sentinel.
    #[must_use]
    pub fn none() -> Self {
        Self {
            value: NO_VERSION.to_string(),
        }
    }

    /// Build from a raw marker string. Blank input yields the sentinel.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let first_line = raw.lines().next().unwrap_or("").trim();
        let value = normalize_tag(first_line);
        if value.is_empty() {
            return Self::none();
        }
        Self {
            value: value.to_string(),
        }
    }

    /// Read the marker file; absence or any read failure yields the sentinel.
    #[must_use]
    pub fn read(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let version = Self::parse(&content);
                tracing::debug!("Local version {} from {}", version, path.display());
                version
            }
            Err(e) => {
                tracing::debug!(
                    "No readable version marker at {} ({e}), assuming {NO_VERSION}",
                    path.display()
                );
                Self::none()
            }
        }
    }

    /// The normalized version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the given remote tag differs from this version.
    #[must_use]
    pub fn differs_from(&self, remote_tag: &str) -> bool {
        is_update_available(&self.value, remote_tag)
    }
}

impl fmt::Display for LocalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
