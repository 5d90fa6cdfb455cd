use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertHabitTagsDto {
    pub tag_ids: Vec<String>,
}

/// Replace the full tag set of a habit. Unchanged sets short-circuit
/// without touching the store; unknown tag ids reject the whole request.
pub async fn upsert_habit_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<UpsertHabitTagsDto>,
) -> Result<Response, ApiError> {
    let mut habit = state.store.get_habit(&id).await?;

    let requested: HashSet<String> = dto.tag_ids.into_iter().collect();
    if requested == habit.tag_ids {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let existing = state.store.existing_tag_ids(&requested).await;
    if existing.len() != requested.len() {
        return Err(ApiError::bad_request("One or more tag ids is invalid"));
    }

    habit.tag_ids = requested;
    habit.updated_at_utc = Some(chrono::Utc::now());
    state.store.update_habit(habit).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete_habit_tag(
    State(state): State<AppState>,
    Path((id, tag_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let mut habit = state.store.get_habit(&id).await?;

    if !habit.tag_ids.remove(&tag_id) {
        return Err(ApiError::not_found(format!(
            "Habit '{}' has no tag '{}'",
            id, tag_id
        )));
    }

    habit.updated_at_utc = Some(chrono::Utc::now());
    state.store.update_habit(habit).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
