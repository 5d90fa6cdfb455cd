use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

/// Profile fields surfaced to API clients, a subset of what GitHub returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubUserProfileDto {
    pub login: String,
    pub name: Option<String>,
    #[serde(rename = "avatarUrl", alias = "avatar_url")]
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "publicRepos", alias = "public_repos")]
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
}

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub request failed: {0}")]
    Request(String),

    #[error("GitHub returned an unexpected status: {0}")]
    UnexpectedStatus(u16),
}

impl From<GitHubError> for ApiError {
    fn from(err: GitHubError) -> Self {
        tracing::warn!("github upstream error: {}", err);
        ApiError::bad_gateway("GitHub is unavailable right now")
    }
}

pub struct GitHubService {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubService {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, base_url }
    }

    /// Fetch the profile of the user the access token belongs to. Returns
    /// None when GitHub rejects the token, so callers can distinguish a
    /// revoked PAT from an outage.
    pub async fn get_user_profile(
        &self,
        access_token: &str,
    ) -> Result<Option<GitHubUserProfileDto>, GitHubError> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", access_token))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, "habit-api")
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        match response.status().as_u16() {
            200 => {
                let profile = response
                    .json::<GitHubUserProfileDto>()
                    .await
                    .map_err(|e| GitHubError::Request(e.to_string()))?;
                Ok(Some(profile))
            }
            401 | 403 => Ok(None),
            status => Err(GitHubError::UnexpectedStatus(status)),
        }
    }
}
