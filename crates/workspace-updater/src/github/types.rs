//! GitHub API types.

use serde::{Deserialize, Serialize};

/// Raw release data from the GitHub API.
///
/// Only the fields the launcher needs are decoded; everything else in the
/// response is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRelease {
    /// The release tag name (e.g., "v1.3.0").
    pub tag_name: String,

    /// Release assets (installers, archives, etc.).
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

/// Release asset data from the GitHub API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubAsset {
    /// Asset filename (e.g., "workspace-setup.exe").
    pub name: String,

    /// Direct download URL.
    pub browser_download_url: String,

    /// File size in bytes as declared by the feed.
    #[serde(default)]
    pub size: u64,
}
