//! Repository host access.
//!
//! Only GitLab is wired. A [`gitlab::GitLabClient`] authenticates once and
//! resolves a project into a [`gitlab::GitLabProject`], which is bound to
//! that single repository for the rest of a review run.

pub mod gitlab;
pub mod types;

pub use gitlab::{GitLabClient, GitLabProject};
pub use types::*;

/// Runtime configuration for the host client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base, e.g. "https://gitlab.com/api/v4"
    pub base_api: String,
    /// Access token (PAT or project access token).
    pub token: String,
}

impl ProviderConfig {
    /// Builds a config from the host's web base URL.
    ///
    /// `https://gitlab.example.com` becomes `https://gitlab.example.com/api/v4`;
    /// a value already ending in `/api/v4` is kept.
    pub fn from_host_url(host_url: &str, token: impl Into<String>) -> Self {
        let trimmed = host_url.trim().trim_end_matches('/');
        let base_api = if trimmed.ends_with("/api/v4") {
            trimmed.to_string()
        } else {
            format!("{trimmed}/api/v4")
        };
        Self {
            base_api,
            token: token.into(),
        }
    }
}
