//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fittrack_core::clock::Clock;
use fittrack_event_store::pg_reward_repository::PgRewardRepository;
use fittrack_test_support::FixedClock;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fittrack_api::build_router;
use fittrack_api::state::AppState;

/// Build the full app router with a real `PgRewardRepository` and a clock
/// fixed on 2026-01-15.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_on(pool, FixedClock::on(2026, 1, 15))
}

/// Build the full app router with a real `PgRewardRepository` and the given
/// clock, for tests that span several days.
pub fn build_test_app_on(pool: PgPool, clock: FixedClock) -> Router {
    let clock: Arc<dyn Clock> = Arc::new(clock);
    let reward_repository = Arc::new(PgRewardRepository::new(pool));
    build_router(AppState::new(clock, reward_repository))
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
