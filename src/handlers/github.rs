use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreGitHubTokenDto {
    pub access_token: String,
}

pub async fn store_access_token(
    State(state): State<AppState>,
    user: AuthUser,
    Json(dto): Json<StoreGitHubTokenDto>,
) -> Result<Response, ApiError> {
    if dto.access_token.trim().is_empty() {
        return Err(ApiError::bad_request("Access token is required"));
    }

    state.store.set_github_pat(&user.identity_id, dto.access_token).await;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Idempotent: revoking when no token is stored is still a 204.
pub async fn revoke_access_token(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, ApiError> {
    match state.store.delete_github_pat(&user.identity_id).await {
        Ok(()) | Err(StoreError::NotFound(_)) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(err) => Err(err.into()),
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, ApiError> {
    let Some(token) = state.store.get_github_pat(&user.identity_id).await else {
        return Err(ApiError::not_found("No GitHub access token is configured"));
    };

    match state.github.get_user_profile(&token).await? {
        Some(profile) => Ok(Json(profile).into_response()),
        None => Err(ApiError::unauthorized("GitHub rejected the configured access token")),
    }
}
