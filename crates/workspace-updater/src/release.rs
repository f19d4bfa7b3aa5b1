//! Release and asset types used by the update flow.
//!
//! These are created fresh for each check and never persisted.

use crate::error::{Result, UpdateError};
use crate::github::GitHubRelease;
use crate::version::normalize_tag;

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Asset file name.
    pub name: String,
    /// Direct download URL.
    pub download_url: String,
    /// Size declared by the feed, in bytes.
    pub size: u64,
}

impl Asset {
    /// File name safe to join onto a download directory.
    ///
    /// Only the last path component of the asset name is kept.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.name
            .rsplit(['/', '\\'])
            .find(|part| !part.is_empty() && *part != "..")
            .unwrap_or("installer")
    }
}

/// Information about the latest published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Remote version tag as published (e.g., "v1.3.0").
    pub tag: String,
    /// Assets in feed order.
    pub assets: Vec<Asset>,
}

impl ReleaseInfo {
    /// The tag without its optional leading `v`.
    #[must_use]
    pub fn version(&self) -> &str {
        normalize_tag(&self.tag)
    }

    /// First asset whose name ends with the installer extension.
    ///
    /// The match ignores ASCII and Unicode case, so `Setup.EXE` counts as an
    /// `.exe` installer. Windows treats extensions this way too.
    pub fn installer_asset(&self, extension: &str) -> Result<&Asset> {
        let extension_lower = extension.to_lowercase();
        self.assets
            .iter()
            .find(|asset| asset.name.to_lowercase().ends_with(&extension_lower))
            .ok_or_else(|| UpdateError::NoInstallerAsset {
                extension: extension.to_string(),
            })
    }
}

impl From<GitHubRelease> for ReleaseInfo {
    fn from(release: GitHubRelease) -> Self {
        Self {
            tag: release.tag_name,
            assets: release
                .assets
                .into_iter()
                .map(|asset| Asset {
                    name: asset.name,
                    download_url: asset.browser_download_url,
                    size: asset.size,
                })
                .collect(),
        }
    }
}
