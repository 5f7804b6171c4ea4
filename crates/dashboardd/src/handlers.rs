//! HTTP handlers for the dashboard API.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use dashboard_api::{
    API_VERSION, AccountRow, ActivityRequest, CategorySlice, GuardQuery, GuardView,
    HealthStatus, LoginRequest, LoginResponse, LogoutReason, LogoutResponse, MetricsView,
    MonthlyRegistrations, RegisterRequest, RegisterResponse, RevenuePoint, SessionView,
};
use dashboard_util::MonotonicInstant;

use crate::error::AppResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(input) = payload?;
    let engine = state.engine.lock().await;
    let user = engine.register(&input.full_name, &input.email, &input.secret)?;
    Ok((StatusCode::CREATED, Json(RegisterResponse::new(user))))
}

/// POST /api/login
///
/// Replaces any session the client context already holds.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(input) = payload?;
    let mut engine = state.engine.lock().await;
    let session = engine.login(
        &input.email,
        &input.secret,
        input.remember_me,
        MonotonicInstant::now(),
    )?;

    Ok(Json(LoginResponse {
        token: session.token,
        user: session.user,
    }))
}

/// POST /api/logout
///
/// `reason` is null when there was no session to end.
pub async fn logout(State(state): State<AppState>) -> AppResult<Json<LogoutResponse>> {
    let mut engine = state.engine.lock().await;
    let reason = engine.logout(LogoutReason::Manual)?;
    Ok(Json(LogoutResponse::from_reason(reason)))
}

/// GET /api/session
pub async fn session(State(state): State<AppState>) -> AppResult<Json<Option<SessionView>>> {
    let engine = state.engine.lock().await;
    Ok(Json(engine.session_view(MonotonicInstant::now())?))
}

/// POST /api/activity
pub async fn activity(
    State(state): State<AppState>,
    payload: Result<Json<ActivityRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(input) = payload?;
    let mut engine = state.engine.lock().await;
    engine.record_activity(input.kind, MonotonicInstant::now());
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/guard?path=
pub async fn guard(
    State(state): State<AppState>,
    query: Result<Query<GuardQuery>, QueryRejection>,
) -> AppResult<Json<GuardView>> {
    let Query(query) = query?;
    let engine = state.engine.lock().await;
    Ok(Json(engine.guard(&query.path)?))
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// GET /api/metrics
pub async fn metrics(State(state): State<AppState>) -> AppResult<Json<MetricsView>> {
    let engine = state.engine.lock().await;
    Ok(Json(engine.metrics()?))
}

/// GET /api/sales-trends
pub async fn sales_trends(State(state): State<AppState>) -> AppResult<Json<Vec<RevenuePoint>>> {
    let engine = state.engine.lock().await;
    Ok(Json(engine.revenue_series()?))
}

/// GET /api/user-growth
pub async fn user_growth(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MonthlyRegistrations>>> {
    let engine = state.engine.lock().await;
    Ok(Json(engine.registrations_by_month()?))
}

/// GET /api/category-distribution
pub async fn category_distribution(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategorySlice>>> {
    let engine = state.engine.lock().await;
    Ok(Json(engine.category_breakdown()?))
}

/// GET /api/users-data
pub async fn users_data(State(state): State<AppState>) -> AppResult<Json<Vec<AccountRow>>> {
    let engine = state.engine.lock().await;
    Ok(Json(engine.accounts_view()?))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let store_healthy = state.engine.lock().await.store_healthy();
    let status = if store_healthy { "ok" } else { "degraded" };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        api_version: API_VERSION,
        store_healthy,
    })
}
