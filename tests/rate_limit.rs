mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};

use habit_api::auth::{generate_jwt, Claims};
use habit_api::config::RateLimitConfig;

use common::*;

fn tight_limits() -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        token_limit: 2,
        tokens_per_period: 1,
        replenishment_secs: 60,
        queue_limit: 0,
        anonymous_permit_limit: 3,
        anonymous_window_secs: 60,
    }
}

fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn anonymous_callers_share_a_fixed_window() {
    let app = rate_limited_app(tight_limits());

    for _ in 0..3 {
        let (status, _, _) = send(&app, get("/habits")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, body) = send(&app, get("/habits")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = headers
        .get("retry-after")
        .expect("Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1 && retry_after <= 60);

    assert_eq!(body["status"], 429);
    assert_eq!(
        body["detail"],
        format!("Too many requests. Please try again after {} seconds.", retry_after)
    );
}

#[tokio::test]
async fn authenticated_callers_get_their_own_partition() {
    let app = rate_limited_app(tight_limits());

    // Exhaust the anonymous window first
    for _ in 0..3 {
        let (status, _, _) = send(&app, get("/habits")).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _, _) = send(&app, get("/habits")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // An authenticated caller is admitted from their own bucket
    let alice = generate_jwt(Claims::new("alice".to_string())).expect("token");
    let (status, _, _) = send(&app, authed_get("/habits", &alice)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&app, authed_get("/habits", &alice)).await;
    assert_eq!(status, StatusCode::OK);

    // Bucket of two is spent; the next request is rejected
    let (status, _, _) = send(&app, authed_get("/habits", &alice)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // A different identity is untouched by alice's exhaustion
    let bob = generate_jwt(Claims::new("bob".to_string())).expect("token");
    let (status, _, _) = send(&app, authed_get("/habits", &bob)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_bearer_tokens_are_rejected_up_front() {
    let app = rate_limited_app(tight_limits());

    let (status, _, body) = send(&app, authed_get("/habits", "not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn health_probes_are_never_rate_limited() {
    let app = rate_limited_app(tight_limits());

    for _ in 0..10 {
        let (status, _, _) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn github_endpoints_require_authentication() {
    let app = test_app();

    let (status, _, _) = send(&app, get("/github/profile")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = generate_jwt(Claims::new("alice".to_string())).expect("token");
    let (status, _, body) = send(&app, authed_get("/github/profile", &token)).await;
    // Authenticated but no PAT stored yet
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}
