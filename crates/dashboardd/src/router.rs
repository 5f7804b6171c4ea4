//! Shared application router builder.
//!
//! Provides [`build_app_router`] so both the binary and the integration tests
//! use the same middleware stack.

use std::time::Duration;

use axum::Router;
use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers;
use crate::state::AppState;

/// Build the full application [`Router`] with tracing and CORS layers.
pub fn build_app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(build_cors_layer())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/session", get(handlers::session))
        .route("/activity", post(handlers::activity))
        .route("/guard", get(handlers::guard))
        .route("/metrics", get(handlers::metrics))
        .route("/sales-trends", get(handlers::sales_trends))
        .route("/user-growth", get(handlers::user_growth))
        .route("/category-distribution", get(handlers::category_distribution))
        .route("/users-data", get(handlers::users_data))
}

/// The dashboard front end is served from a different origin during development.
pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
