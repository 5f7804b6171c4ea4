use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dashboard_api::{ErrorBody, ErrorCode};
use dashboard_util::DashboardError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`DashboardError`] for domain errors and adds request-shape errors.
/// Implements [`IntoResponse`] to produce `{message, code}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Dashboard(err) => match err {
                DashboardError::ValidationError(msg) => {
                    (StatusCode::BAD_REQUEST, ErrorCode::ValidationError, msg.clone())
                }
                DashboardError::DuplicateEmail(_) => {
                    (StatusCode::CONFLICT, ErrorCode::DuplicateEmail, err.to_string())
                }
                DashboardError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::InvalidCredentials,
                    err.to_string(),
                ),
                DashboardError::NoActiveSession => {
                    (StatusCode::BAD_REQUEST, ErrorCode::ValidationError, err.to_string())
                }
                DashboardError::DataUnavailable(msg) => {
                    tracing::warn!(error = %msg, "Data unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        ErrorCode::DataUnavailable,
                        "Data is temporarily unavailable".to_string(),
                    )
                }
                DashboardError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalError,
                        "An internal error occurred".to_string(),
                    )
                }
            },
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationError, msg.clone())
            }
        };

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}
