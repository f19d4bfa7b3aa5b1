//! Check the release feed for an update.

use crate::config::LauncherSettings;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::release::ReleaseInfo;
use crate::version::LocalVersion;

/// Compares the latest published release with the locally installed version.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    client: GitHubClient,
    local: LocalVersion,
}

impl VersionResolver {
    /// Creates a resolver for the given settings and local version.
    pub fn new(settings: &LauncherSettings, local: LocalVersion) -> Result<Self> {
        let client = GitHubClient::new(&settings.feed, &settings.download.user_agent)?;
        Ok(Self { client, local })
    }

    /// Checks for an update, reporting failures to the caller.
    ///
    /// Returns `Some(ReleaseInfo)` if the remote tag differs from the local
    /// version, `None` if they are equal.
    pub fn try_check(&self) -> Result<Option<ReleaseInfo>> {
        tracing::info!("Checking for updates (current version: {})", self.local);

        let release: ReleaseInfo = self.client.latest_release()?.into();

        if !self.local.differs_from(&release.tag) {
            tracing::info!(
                "No update available (current: {}, latest: {})",
                self.local,
                release.version()
            );
            return Ok(None);
        }

        tracing::info!(
            "Update available: {} -> {} ({} assets)",
            self.local,
            release.version(),
            release.assets.len()
        );
        Ok(Some(release))
    }

    /// Checks for an update; any failure counts as "no update available".
    #[must_use]
    pub fn check(&self) -> Option<ReleaseInfo> {
        match self.try_check() {
            Ok(release) => release,
            Err(e) => {
                tracing::warn!("Update check failed: {e}");
                None
            }
        }
    }
}
