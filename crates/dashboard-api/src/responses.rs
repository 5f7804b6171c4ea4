//! Response bodies produced by the dashboard API

use dashboard_util::SessionToken;
use serde::{Deserialize, Serialize};

use crate::{GuardDecision, LogoutReason, PublicUser, SessionTier, SessionUser};

/// `201` body for a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

impl RegisterResponse {
    pub fn new(user: PublicUser) -> Self {
        Self {
            message: "Registration successful!".to_string(),
            user,
        }
    }
}

/// `200` body for a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: SessionToken,
    pub user: SessionUser,
}

/// Body returned by `POST /api/logout`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// `None` when there was no session to end
    pub reason: Option<LogoutReason>,
    pub redirect: String,
}

impl LogoutResponse {
    pub fn from_reason(reason: Option<LogoutReason>) -> Self {
        let redirect = reason
            .map(|r| r.redirect_path())
            .unwrap_or(LogoutReason::Manual.redirect_path());
        Self {
            reason,
            redirect: redirect.to_string(),
        }
    }
}

/// Current session as seen by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: SessionUser,
    pub tier: SessionTier,
    pub initials: String,
    /// Seconds until inactivity logout; `None` when the watchdog is disarmed
    pub inactivity_remaining_secs: Option<u64>,
}

/// Body returned by `GET /api/guard`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardView {
    pub decision: GuardDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Health probe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub api_version: u32,
    pub store_healthy: bool,
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    DuplicateEmail,
    InvalidCredentials,
    DataUnavailable,
    InternalError,
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: ErrorCode,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}
