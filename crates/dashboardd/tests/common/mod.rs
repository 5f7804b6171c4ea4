#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header::CONTENT_TYPE};
use dashboard_config::Settings;
use dashboard_core::DashboardEngine;
use dashboard_store::{RecordStore, SqliteStore};
use dashboardd::{AppState, build_app_router};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Build the full application router over a seeded in-memory store.
///
/// Uses the same router builder as the binary, so tests exercise the
/// production middleware stack.
pub fn build_test_app() -> (Router, AppState) {
    build_test_app_with(Settings::default())
}

pub fn build_test_app_with(settings: Settings) -> (Router, AppState) {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    store.seed_if_empty(&settings.seed).unwrap();

    let state = AppState::new(DashboardEngine::new(&settings, store));
    (build_app_router(state.clone()), state)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
