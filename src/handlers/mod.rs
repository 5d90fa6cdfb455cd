pub mod entries;
pub mod github;
pub mod habit_tags;
pub mod habits;
pub mod tags;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

/// JSON response carrying the negotiated vendor content type.
pub(crate) fn negotiated_json(
    status: StatusCode,
    content_type: &'static str,
    body: Value,
) -> Response {
    let mut response = (status, Json(body)).into_response();
    if let Ok(value) = content_type.parse() {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}
