use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::error::ApiError;

/// Authenticated caller context extracted from a bearer JWT.
///
/// Authentication is optional at the middleware level: requests without an
/// Authorization header pass through anonymously (and get the anonymous
/// rate-limit partition). A header that is present but malformed or carries
/// an invalid token is rejected up front instead of silently downgraded.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub identity_id: String,
}

pub async fn identity_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_bearer_token(&headers)? {
        let claims = auth::validate_jwt(&token)
            .map_err(|e| ApiError::unauthorized(e.to_string()))?;
        request.extensions_mut().insert(AuthUser { identity_id: claims.sub });
    }

    Ok(next.run(request).await)
}

/// None when no Authorization header is present; Err on a malformed one.
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Authorization header must use Bearer token format"))?;

    if token.trim().is_empty() {
        return Err(ApiError::unauthorized("Empty JWT token"));
    }

    Ok(Some(token.to_string()))
}

/// Extractor form for handlers that require an authenticated caller.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
