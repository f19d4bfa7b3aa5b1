//! Blocking GitHub API client for fetching release information.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use super::types::GitHubRelease;
use crate::config::FeedSettings;
use crate::error::{Result, UpdateError};

/// GitHub API client bound to one repository's latest-release endpoint.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    url: String,
}

impl GitHubClient {
    /// Creates a client for the feed described by `feed`.
    pub fn new(feed: &FeedSettings, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .timeout(feed.check_timeout())
            .build()
            .map_err(|e| UpdateError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: feed.latest_release_url(),
        })
    }

    /// Fetches the latest release.
    pub fn latest_release(&self) -> Result<GitHubRelease> {
        tracing::debug!("Fetching latest release from {}", self.url);

        let response = self.client.get(&self.url).send()?;
        self.handle_response(response)
    }

    /// Checks the response status and decodes the release body.
    fn handle_response(&self, response: Response) -> Result<GitHubRelease> {
        let status = response.status();

        if status == StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .is_some_and(|remaining| remaining.to_str().unwrap_or("1") == "0")
        {
            let retry_after = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|reset| {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0);
                    reset.saturating_sub(now)
                })
                .unwrap_or(60);

            return Err(UpdateError::RateLimited { retry_after });
        }

        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text()?;
        let release: GitHubRelease = serde_json::from_str(&body)?;
        Ok(release)
    }
}
