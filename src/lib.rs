pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod hypermedia;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod services;
pub mod shaping;
pub mod sorting;
pub mod state;
pub mod store;

use axum::routing::{delete, get, post, put};
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{entries, github, habit_tags, habits, tags};
use crate::hypermedia::RouteName;
use crate::state::AppState;

/// Build the full application router.
///
/// The API routes sit behind identity extraction and the rate limiter;
/// `/` and `/health` stay outside both so probes never burn a permit.
pub fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            RouteName::Habits.template(),
            get(habits::list_habits).post(habits::create_habit),
        )
        .route(
            RouteName::HabitById.template(),
            get(habits::get_habit)
                .put(habits::update_habit)
                .patch(habits::patch_habit)
                .delete(habits::delete_habit),
        )
        .route(RouteName::HabitArchive.template(), put(habits::archive_habit))
        .route(RouteName::HabitUnarchive.template(), put(habits::unarchive_habit))
        .route(RouteName::HabitTags.template(), put(habit_tags::upsert_habit_tags))
        .route(RouteName::HabitTagById.template(), delete(habit_tags::delete_habit_tag))
        .route(RouteName::Tags.template(), get(tags::list_tags).post(tags::create_tag))
        .route(
            RouteName::TagById.template(),
            get(tags::get_tag).put(tags::update_tag).delete(tags::delete_tag),
        )
        .route(
            RouteName::Entries.template(),
            get(entries::list_entries).post(entries::create_entry),
        )
        .route(RouteName::EntryBatch.template(), post(entries::create_entry_batch))
        .route(
            RouteName::EntryById.template(),
            get(entries::get_entry).put(entries::update_entry).delete(entries::delete_entry),
        )
        .route(
            RouteName::GitHubPat.template(),
            put(github::store_access_token).delete(github::revoke_access_token),
        )
        .route(RouteName::GitHubProfile.template(), get(github::get_profile))
        // Outermost layer runs first: identity before admission, so an
        // authenticated caller lands in their own partition
        .layer(axum::middleware::from_fn_with_state(
            state.limiter.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::identity_middleware))
        .with_state(state);

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api_routes);

    if config::config().api.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http())
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Habit API",
        "version": version,
        "description": "Habit tracking REST API with data shaping, hypermedia links and rate limiting",
        "endpoints": {
            "habits": "/habits[/:id]",
            "habit_tags": "/habits/:id/tags[/:tag_id]",
            "tags": "/tags[/:id]",
            "entries": "/entries[/:id], /entries/batch",
            "github": "/github/personal-access-token, /github/profile",
            "health": "/health",
        },
    }))
}

async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
