//! GitHub release feed client and types.
//!
//! This module provides a blocking client for the GitHub Releases API.

pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::{GitHubAsset, GitHubRelease};
