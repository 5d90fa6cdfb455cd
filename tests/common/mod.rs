#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use habit_api::config::RateLimitConfig;
use habit_api::state::AppState;
use habit_api::store::MemoryStore;

/// App with a fresh in-memory store and the default (dev) config, which
/// keeps the rate limiter disabled.
pub fn test_app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new())).expect("app state");
    habit_api::app(state)
}

/// App with the rate limiter enabled under an explicit budget.
pub fn rate_limited_app(rate_limit: RateLimitConfig) -> Router {
    let state = AppState::with_rate_limit(Arc::new(MemoryStore::new()), rate_limit)
        .expect("app state");
    habit_api::app(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).expect("request")
}

pub fn get_with_accept(uri: &str, accept: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("accept", accept)
        .body(Body::empty())
        .expect("request")
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize")))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).expect("request")
}

pub fn sample_habit(name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "type": "measurable",
        "frequency": { "type": "daily", "timesPerPeriod": 1 },
        "target": { "value": 30, "unit": "pages" }
    })
}

/// Create a habit and return its id.
pub async fn create_habit(app: &Router, name: &str) -> String {
    let (status, _, body) = send(app, json_request("POST", "/habits", &sample_habit(name))).await;
    assert_eq!(status, StatusCode::CREATED, "create habit failed: {}", body);
    body["id"].as_str().expect("habit id").to_string()
}
