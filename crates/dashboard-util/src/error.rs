//! Error taxonomy for the dashboard service

use thiserror::Error;

/// Core error type for dashboard operations.
///
/// Every variant is recoverable at the call site. `InvalidCredentials`
/// deliberately carries no detail so callers cannot tell an unknown email
/// from a wrong secret.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("{0}")]
    ValidationError(String),

    #[error("An account with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No active session")]
    NoActiveSession,

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_message_has_no_detail() {
        assert_eq!(DashboardError::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn validation_message_is_passed_through() {
        assert_eq!(
            DashboardError::validation("Email is required").to_string(),
            "Email is required"
        );
    }
}
