use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::{collection_body, ApiVersion, NegotiatedMedia, PageMeta};
use crate::api::pagination::clamp_paging;
use crate::config;
use crate::error::ApiError;
use crate::hypermedia::{CollectionContext, LinkState, RouteName};
use crate::models::{
    CreateHabitDto, Habit, HabitDto, HabitDtoV2, HabitStatus, HabitType, PatchHabitDto,
    ResourceKind, UpdateHabitDto,
};
use crate::shaping::{select_fields, shape_resource, FieldSchema, ShapedResource, Shapeable};
use crate::sorting::compile;
use crate::state::AppState;
use crate::store::HabitFilter;

use super::negotiated_json;

#[derive(Debug, Deserialize, Default)]
pub struct ListHabitsQuery {
    pub page: Option<usize>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<usize>,
    pub sort: Option<String>,
    pub fields: Option<String>,
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ResourceQuery {
    pub fields: Option<String>,
}

fn schema_for(version: ApiVersion) -> &'static FieldSchema {
    match version {
        ApiVersion::V1 => <HabitDto as Shapeable>::schema(),
        ApiVersion::V2 => <HabitDtoV2 as Shapeable>::schema(),
    }
}

fn parse_filter(query: &ListHabitsQuery) -> Result<HabitFilter, ApiError> {
    let habit_type = match query.habit_type.as_deref() {
        None => None,
        Some(raw) => Some(HabitType::parse(raw).ok_or_else(|| {
            ApiError::bad_request(format!("The provided type filter isn't valid: '{}'", raw))
        })?),
    };
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(HabitStatus::parse(raw).ok_or_else(|| {
            ApiError::bad_request(format!("The provided status filter isn't valid: '{}'", raw))
        })?),
    };
    Ok(HabitFilter { search: query.q.clone(), habit_type, status })
}

/// Shape one habit for the negotiated version, appending links in
/// hypermedia mode.
async fn shaped_habit(
    state: &AppState,
    habit: &Habit,
    media: NegotiatedMedia,
    fields: Option<&str>,
) -> Result<ShapedResource, ApiError> {
    let tags = state.store.tag_names(&habit.tag_ids).await;
    let mut shaped = match media.version {
        ApiVersion::V1 => shape_resource(&habit.to_dto(tags), fields)?,
        ApiVersion::V2 => shape_resource(&habit.to_dto_v2(tags), fields)?,
    };
    if media.hateoas {
        let links = state
            .links
            .resource_links(ResourceKind::Habit, &LinkState::new(&habit.id, habit.is_archived));
        shaped.insert("links".to_string(), serde_json::to_value(links).unwrap_or(Value::Null));
    }
    Ok(shaped)
}

pub async fn list_habits(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Query(query): Query<ListHabitsQuery>,
) -> Result<Response, ApiError> {
    // Validate sort and fields before any data access
    let mapping = state.sort_registry.resolve(ResourceKind::Habit)?;
    let sort_fields = match query.sort.as_deref() {
        Some(sort) => compile(sort, mapping)?,
        None => Vec::new(),
    };
    select_fields(schema_for(media.version), query.fields.as_deref())?;

    let filter = parse_filter(&query)?;
    let (page, page_size) = clamp_paging(query.page, query.page_size);

    let result = state.store.list_habits(&filter, &sort_fields, page, page_size).await;

    let mut items = Vec::with_capacity(result.items.len());
    for habit in &result.items {
        let shaped = shaped_habit(&state, habit, media, query.fields.as_deref()).await?;
        items.push(Value::Object(shaped));
    }

    let meta = PageMeta { page, page_size, total_count: result.total_count };
    let links = media.hateoas.then(|| {
        state.links.collection_links(
            ResourceKind::Habit,
            &CollectionContext {
                page,
                page_size,
                total_pages: meta.total_pages(),
                sort: query.sort.as_deref(),
                fields: query.fields.as_deref(),
            },
        )
    });

    Ok(negotiated_json(
        StatusCode::OK,
        media.content_type,
        collection_body(items, meta, links),
    ))
}

pub async fn get_habit(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Path(id): Path<String>,
    Query(query): Query<ResourceQuery>,
) -> Result<Response, ApiError> {
    select_fields(schema_for(media.version), query.fields.as_deref())?;

    let habit = state.store.get_habit(&id).await?;
    let shaped = shaped_habit(&state, &habit, media, query.fields.as_deref()).await?;

    Ok(negotiated_json(StatusCode::OK, media.content_type, Value::Object(shaped)))
}

pub async fn create_habit(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Json(dto): Json<CreateHabitDto>,
) -> Result<Response, ApiError> {
    dto.validate()
        .map_err(|errors| ApiError::validation_error("One or more validation errors occurred", errors))?;

    let habit = dto.to_entity();
    state.store.insert_habit(habit.clone()).await?;

    let shaped = shaped_habit(&state, &habit, media, None).await?;
    let location =
        RouteName::HabitById.href(&config::config().api.public_base_url, &[("id", &habit.id)]);

    let mut response =
        negotiated_json(StatusCode::CREATED, media.content_type, Value::Object(shaped));
    if let Ok(value) = location.parse() {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<UpdateHabitDto>,
) -> Result<Response, ApiError> {
    dto.validate()
        .map_err(|errors| ApiError::validation_error("One or more validation errors occurred", errors))?;

    let mut habit = state.store.get_habit(&id).await?;
    dto.apply(&mut habit);
    state.store.update_habit(habit).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn patch_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<PatchHabitDto>,
) -> Result<Response, ApiError> {
    dto.validate()
        .map_err(|errors| ApiError::validation_error("One or more validation errors occurred", errors))?;

    let mut habit = state.store.get_habit(&id).await?;
    dto.apply(&mut habit);
    state.store.update_habit(habit).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state.store.delete_habit(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn archive_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    set_archived(&state, &id, true).await
}

pub async fn unarchive_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    set_archived(&state, &id, false).await
}

/// Idempotent: archiving an archived habit (or the reverse) is a no-op 204.
async fn set_archived(state: &AppState, id: &str, archived: bool) -> Result<Response, ApiError> {
    let mut habit = state.store.get_habit(id).await?;
    if habit.is_archived != archived {
        habit.is_archived = archived;
        habit.updated_at_utc = Some(chrono::Utc::now());
        state.store.update_habit(habit).await?;
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}
