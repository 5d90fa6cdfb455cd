use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{collection_body, NegotiatedMedia, PageMeta};
use crate::api::pagination::clamp_paging;
use crate::config;
use crate::error::ApiError;
use crate::hypermedia::{CollectionContext, LinkState, RouteName};
use crate::models::{CreateEntryDto, Entry, EntryDto, ResourceKind, UpdateEntryDto};
use crate::shaping::{select_fields, shape_resource, ShapedResource, Shapeable};
use crate::sorting::compile;
use crate::state::AppState;
use crate::store::EntryFilter;

use super::negotiated_json;

#[derive(Debug, Deserialize, Default)]
pub struct ListEntriesQuery {
    pub page: Option<usize>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<usize>,
    pub sort: Option<String>,
    pub fields: Option<String>,
    #[serde(alias = "habitId")]
    pub habit_id: Option<String>,
}

fn shaped_entry(
    state: &AppState,
    entry: &Entry,
    media: NegotiatedMedia,
    fields: Option<&str>,
) -> Result<ShapedResource, ApiError> {
    let mut shaped = shape_resource(&entry.to_dto(), fields)?;
    if media.hateoas {
        let links =
            state.links.resource_links(ResourceKind::Entry, &LinkState::new(&entry.id, false));
        shaped.insert("links".to_string(), serde_json::to_value(links).unwrap_or(Value::Null));
    }
    Ok(shaped)
}

pub async fn list_entries(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Response, ApiError> {
    let mapping = state.sort_registry.resolve(ResourceKind::Entry)?;
    let sort_fields = match query.sort.as_deref() {
        Some(sort) => compile(sort, mapping)?,
        None => Vec::new(),
    };
    select_fields(<EntryDto as Shapeable>::schema(), query.fields.as_deref())?;

    let filter = EntryFilter { habit_id: query.habit_id.clone() };
    let (page, page_size) = clamp_paging(query.page, query.page_size);
    let result = state.store.list_entries(&filter, &sort_fields, page, page_size).await;

    let items = result
        .items
        .iter()
        .map(|entry| shaped_entry(&state, entry, media, query.fields.as_deref()).map(Value::Object))
        .collect::<Result<Vec<_>, _>>()?;

    let meta = PageMeta { page, page_size, total_count: result.total_count };
    let links = media.hateoas.then(|| {
        state.links.collection_links(
            ResourceKind::Entry,
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

pub async fn get_entry(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let entry = state.store.get_entry(&id).await?;
    let shaped = shaped_entry(&state, &entry, media, None)?;
    Ok(negotiated_json(StatusCode::OK, media.content_type, Value::Object(shaped)))
}

pub async fn create_entry(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Json(dto): Json<CreateEntryDto>,
) -> Result<Response, ApiError> {
    dto.validate()
        .map_err(|errors| ApiError::validation_error("One or more validation errors occurred", errors))?;

    // The referenced habit must exist before an entry is recorded against it
    state.store.get_habit(&dto.habit_id).await?;

    let entry = dto.to_entity();
    state.store.insert_entry(entry.clone()).await?;

    let shaped = shaped_entry(&state, &entry, media, None)?;
    let location =
        RouteName::EntryById.href(&config::config().api.public_base_url, &[("id", &entry.id)]);

    let mut response =
        negotiated_json(StatusCode::CREATED, media.content_type, Value::Object(shaped));
    if let Ok(value) = location.parse() {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

/// Create several entries in one call. All of them are validated (and their
/// habits checked) before any insert happens, so a bad batch changes nothing.
pub async fn create_entry_batch(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Json(dtos): Json<Vec<CreateEntryDto>>,
) -> Result<Response, ApiError> {
    if dtos.is_empty() {
        return Err(ApiError::bad_request("The batch must contain at least one entry"));
    }

    for dto in &dtos {
        dto.validate().map_err(|errors| {
            ApiError::validation_error("One or more validation errors occurred", errors)
        })?;
        state.store.get_habit(&dto.habit_id).await?;
    }

    let mut items = Vec::with_capacity(dtos.len());
    for dto in &dtos {
        let entry = dto.to_entity();
        state.store.insert_entry(entry.clone()).await?;
        items.push(Value::Object(shaped_entry(&state, &entry, media, None)?));
    }

    Ok(negotiated_json(StatusCode::CREATED, media.content_type, json!({ "items": items })))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<UpdateEntryDto>,
) -> Result<Response, ApiError> {
    dto.validate()
        .map_err(|errors| ApiError::validation_error("One or more validation errors occurred", errors))?;

    let mut entry = state.store.get_entry(&id).await?;
    dto.apply(&mut entry);
    state.store.update_entry(entry).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state.store.delete_entry(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
