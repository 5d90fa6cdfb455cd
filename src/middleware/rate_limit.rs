use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::rate_limit::RateLimiterStore;

/// Admission gate. Runs after identity extraction so authenticated callers
/// land in their own partition; everyone else shares the anonymous window.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterStore>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity_id = request
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.identity_id.clone());

    if let Err(rejection) = limiter.acquire(identity_id.as_deref()).await {
        tracing::warn!(
            identity = identity_id.as_deref().unwrap_or("anonymous"),
            retry_after_secs = rejection.retry_after_secs(),
            "request rejected by rate limiter"
        );
        return Err(ApiError::too_many_requests(rejection.retry_after_secs()));
    }

    Ok(next.run(request).await)
}
