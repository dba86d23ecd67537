use axum::{
    body::{self, Body},
    http::{self, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use srql_compiler::{config::AppConfig, server::Server, time::FixedClock};
use std::sync::{Arc, Once};
use tower::ServiceExt;

static TRACING_INIT: Once = Once::new();

/// Router over an in-process server pinned to 2025-03-01.
pub fn router(config: AppConfig) -> Router {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });

    let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"));
    Server::with_clock(config, Arc::new(clock)).router()
}

pub async fn post_json(router: &Router, path: &str, payload: Value) -> http::Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("failed to build request");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should handle request")
}

pub async fn get(router: &Router, path: &str) -> http::Response<Body> {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should handle request")
}

pub async fn read_json(response: http::Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("response body should be readable");
    let value =
        serde_json::from_slice::<Value>(&bytes).expect("response body should be valid JSON");
    (status, value)
}
