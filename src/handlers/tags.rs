use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::{collection_body, NegotiatedMedia, PageMeta};
use crate::api::pagination::clamp_paging;
use crate::config;
use crate::error::ApiError;
use crate::hypermedia::{CollectionContext, LinkState, RouteName};
use crate::models::{CreateTagDto, ResourceKind, Tag, TagDto, UpdateTagDto};
use crate::shaping::{select_fields, shape_resource, ShapedResource, Shapeable};
use crate::sorting::compile;
use crate::state::AppState;

use super::negotiated_json;

#[derive(Debug, Deserialize, Default)]
pub struct ListTagsQuery {
    pub page: Option<usize>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<usize>,
    pub sort: Option<String>,
    pub fields: Option<String>,
}

fn shaped_tag(
    state: &AppState,
    tag: &Tag,
    media: NegotiatedMedia,
    fields: Option<&str>,
) -> Result<ShapedResource, ApiError> {
    let mut shaped = shape_resource(&tag.to_dto(), fields)?;
    if media.hateoas {
        let links = state.links.resource_links(ResourceKind::Tag, &LinkState::new(&tag.id, false));
        shaped.insert("links".to_string(), serde_json::to_value(links).unwrap_or(Value::Null));
    }
    Ok(shaped)
}

pub async fn list_tags(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Query(query): Query<ListTagsQuery>,
) -> Result<Response, ApiError> {
    let mapping = state.sort_registry.resolve(ResourceKind::Tag)?;
    let sort_fields = match query.sort.as_deref() {
        Some(sort) => compile(sort, mapping)?,
        None => Vec::new(),
    };
    select_fields(<TagDto as Shapeable>::schema(), query.fields.as_deref())?;

    let (page, page_size) = clamp_paging(query.page, query.page_size);
    let result = state.store.list_tags(&sort_fields, page, page_size).await;

    let items = result
        .items
        .iter()
        .map(|tag| shaped_tag(&state, tag, media, query.fields.as_deref()).map(Value::Object))
        .collect::<Result<Vec<_>, _>>()?;

    let meta = PageMeta { page, page_size, total_count: result.total_count };
    let links = media.hateoas.then(|| {
        state.links.collection_links(
            ResourceKind::Tag,
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

pub async fn get_tag(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let tag = state.store.get_tag(&id).await?;
    let shaped = shaped_tag(&state, &tag, media, None)?;
    Ok(negotiated_json(StatusCode::OK, media.content_type, Value::Object(shaped)))
}

pub async fn create_tag(
    State(state): State<AppState>,
    media: NegotiatedMedia,
    Json(dto): Json<CreateTagDto>,
) -> Result<Response, ApiError> {
    dto.validate()
        .map_err(|errors| ApiError::validation_error("One or more validation errors occurred", errors))?;

    let tag = dto.to_entity();
    state.store.insert_tag(tag.clone()).await?;

    let shaped = shaped_tag(&state, &tag, media, None)?;
    let location =
        RouteName::TagById.href(&config::config().api.public_base_url, &[("id", &tag.id)]);

    let mut response =
        negotiated_json(StatusCode::CREATED, media.content_type, Value::Object(shaped));
    if let Ok(value) = location.parse() {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<UpdateTagDto>,
) -> Result<Response, ApiError> {
    dto.validate()
        .map_err(|errors| ApiError::validation_error("One or more validation errors occurred", errors))?;

    let mut tag = state.store.get_tag(&id).await?;
    dto.apply(&mut tag);
    state.store.update_tag(tag).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state.store.delete_tag(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
