//! Accept-header negotiation: API version plus hypermedia mode.
//!
//! Vendor media types follow `application/vnd.habit-api[.hateoas].v{N}+json`.
//! A plain `application/json` (or no preference) selects v1 without links;
//! anything unrecognized is a 406.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT;
use axum::http::request::Parts;

use crate::error::ApiError;

pub const JSON: &str = "application/json";
pub const JSON_V1: &str = "application/vnd.habit-api.v1+json";
pub const JSON_V2: &str = "application/vnd.habit-api.v2+json";
pub const HATEOAS_JSON: &str = "application/vnd.habit-api.hateoas+json";
pub const HATEOAS_JSON_V1: &str = "application/vnd.habit-api.hateoas.v1+json";
pub const HATEOAS_JSON_V2: &str = "application/vnd.habit-api.hateoas.v2+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

/// Outcome of content negotiation for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedMedia {
    pub version: ApiVersion,
    pub hateoas: bool,
    /// Content type to echo back on the response
    pub content_type: &'static str,
}

impl Default for NegotiatedMedia {
    fn default() -> Self {
        Self { version: ApiVersion::V1, hateoas: false, content_type: JSON }
    }
}

impl NegotiatedMedia {
    /// Negotiate against a raw Accept header value. `None` and wildcard
    /// ranges fall back to plain v1 JSON; a header that offers only
    /// unsupported types is rejected.
    pub fn from_accept(accept: Option<&str>) -> Result<Self, ApiError> {
        let Some(accept) = accept else {
            return Ok(Self::default());
        };
        if accept.trim().is_empty() {
            return Ok(Self::default());
        }

        for entry in accept.split(',') {
            // Drop quality and other media-type parameters
            let media = entry.split(';').next().unwrap_or("").trim();

            let negotiated = match media {
                "*/*" | "application/*" | JSON => Some(Self::default()),
                JSON_V1 => Some(Self { version: ApiVersion::V1, hateoas: false, content_type: JSON_V1 }),
                JSON_V2 => Some(Self { version: ApiVersion::V2, hateoas: false, content_type: JSON_V2 }),
                HATEOAS_JSON | HATEOAS_JSON_V1 => {
                    Some(Self { version: ApiVersion::V1, hateoas: true, content_type: HATEOAS_JSON_V1 })
                }
                HATEOAS_JSON_V2 => {
                    Some(Self { version: ApiVersion::V2, hateoas: true, content_type: HATEOAS_JSON_V2 })
                }
                _ => None,
            };

            if let Some(negotiated) = negotiated {
                return Ok(negotiated);
            }
        }

        Err(ApiError::not_acceptable(format!(
            "None of the requested media types are supported: '{}'",
            accept
        )))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for NegotiatedMedia
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok());
        Self::from_accept(accept)
    }
}
