//! Request bodies accepted by the dashboard API

use serde::{Deserialize, Serialize};

use crate::ActivityKind;

/// `POST /api/register`
///
/// Missing fields deserialize as empty strings so validation, not the JSON
/// extractor, reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "password")]
    pub secret: String,
}

/// `POST /api/login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "password")]
    pub secret: String,
    /// "Keep me logged in"
    #[serde(default, alias = "keepLoggedIn")]
    pub remember_me: bool,
}

/// `POST /api/activity`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRequest {
    pub kind: ActivityKind,
}

/// Query for `GET /api/guard`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardQuery {
    pub path: String,
}
