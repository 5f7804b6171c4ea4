//! Configuration validation

use crate::schema::{RawAnalyticsConfig, RawConfig, RawSeedAccount, RawSessionConfig};
use dashboard_util::parse_date;
use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

/// Default minimum secret length
pub const DEFAULT_MIN_SECRET_LENGTH: usize = 6;

/// Longest durable retention accepted
pub const MAX_RETENTION_DAYS: u64 = 3650;

/// Longest inactivity timeout accepted (one day)
pub const MAX_INACTIVITY_TIMEOUT_SECS: u64 = 86_400;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid listen address '{0}'")]
    InvalidListenAddr(String),

    #[error("Session config error: {0}")]
    SessionError(String),

    #[error("Analytics config error: {0}")]
    AnalyticsError(String),

    #[error("Seed account '{email}': {message}")]
    SeedAccountError { email: String, message: String },

    #[error("Duplicate seed email: {0}")]
    DuplicateSeedEmail(String),

    #[error("Duplicate seed account ID: {0}")]
    DuplicateSeedId(String),

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(addr) = &config.service.listen_addr
        && addr.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidListenAddr(addr.clone()));
    }

    errors.extend(validate_session(&config.session));
    errors.extend(validate_analytics(&config.analytics));

    let min_secret = config
        .session
        .min_secret_length
        .unwrap_or(DEFAULT_MIN_SECRET_LENGTH);

    if let Some(accounts) = &config.seed.accounts {
        let mut seen_emails = HashSet::new();
        let mut seen_ids = HashSet::new();
        for account in accounts {
            let email = account.email.trim();
            if !seen_emails.insert(email) {
                errors.push(ValidationError::DuplicateSeedEmail(email.to_string()));
            }
            if let Some(id) = &account.id
                && !seen_ids.insert(id.as_str())
            {
                errors.push(ValidationError::DuplicateSeedId(id.clone()));
            }
            errors.extend(validate_seed_account(account, min_secret));
        }
    }

    if let Some(revenue) = &config.seed.revenue {
        for event in revenue {
            if parse_date(&event.date).is_none() {
                errors.push(ValidationError::InvalidDate {
                    value: event.date.clone(),
                });
            }
        }
    }

    errors
}

fn validate_session(session: &RawSessionConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match session.inactivity_timeout_seconds {
        Some(0) => errors.push(ValidationError::SessionError(
            "inactivity_timeout_seconds must be greater than zero".into(),
        )),
        Some(secs) if secs > MAX_INACTIVITY_TIMEOUT_SECS => {
            errors.push(ValidationError::SessionError(format!(
                "inactivity_timeout_seconds must be at most {}",
                MAX_INACTIVITY_TIMEOUT_SECS
            )))
        }
        _ => {}
    }

    match session.durable_retention_days {
        Some(0) => errors.push(ValidationError::SessionError(
            "durable_retention_days must be greater than zero".into(),
        )),
        Some(days) if days > MAX_RETENTION_DAYS => {
            errors.push(ValidationError::SessionError(format!(
                "durable_retention_days must be at most {}",
                MAX_RETENTION_DAYS
            )))
        }
        _ => {}
    }

    if session.min_secret_length == Some(0) {
        errors.push(ValidationError::SessionError(
            "min_secret_length must be greater than zero".into(),
        ));
    }

    errors
}

fn validate_analytics(analytics: &RawAnalyticsConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match analytics.active_sessions.as_deref() {
        None | Some("random") => {
            let min = analytics.random_min.unwrap_or(crate::DEFAULT_RANDOM_MIN);
            let max = analytics.random_max.unwrap_or(crate::DEFAULT_RANDOM_MAX);
            if min > max {
                errors.push(ValidationError::AnalyticsError(format!(
                    "random_min ({}) exceeds random_max ({})",
                    min, max
                )));
            }
        }
        Some("logged_in") => {}
        Some(other) => errors.push(ValidationError::AnalyticsError(format!(
            "unknown active_sessions mode '{}' (expected \"random\" or \"logged_in\")",
            other
        ))),
    }

    errors
}

fn validate_seed_account(account: &RawSeedAccount, min_secret: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let error = |message: &str| ValidationError::SeedAccountError {
        email: account.email.clone(),
        message: message.to_string(),
    };

    if account.full_name.trim().is_empty() {
        errors.push(error("full_name cannot be empty"));
    }

    if !account.email.trim().contains('@') {
        errors.push(error("email must contain '@'"));
    }

    if account.secret.chars().count() < min_secret {
        errors.push(error(&format!(
            "secret must be at least {} characters",
            min_secret
        )));
    }

    if parse_date(&account.registered_on).is_none() {
        errors.push(ValidationError::InvalidDate {
            value: account.registered_on.clone(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_account(email: &str, secret: &str, date: &str) -> RawSeedAccount {
        RawSeedAccount {
            id: None,
            full_name: "Ann Example".into(),
            email: email.into(),
            secret: secret.into(),
            registered_on: date.into(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RawConfig {
            config_version: 1,
            ..Default::default()
        };
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = RawConfig::default();
        config.session.inactivity_timeout_seconds = Some(0);

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::SessionError(_)));
    }

    #[test]
    fn test_oversized_timeout_rejected() {
        let mut config = RawConfig::default();
        config.session.inactivity_timeout_seconds = Some(i64::MAX as u64);

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::SessionError(_)));

        config.session.inactivity_timeout_seconds = Some(MAX_INACTIVITY_TIMEOUT_SECS);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_random_bounds_checked() {
        let mut config = RawConfig::default();
        config.analytics.random_min = Some(600);

        let errors = validate_config(&config);
        assert!(matches!(errors[0], ValidationError::AnalyticsError(_)));

        config.analytics.active_sessions = Some("logged_in".into());
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_seed_errors_collected() {
        let mut config = RawConfig::default();
        config.seed.accounts = Some(vec![
            seed_account("a@x.com", "secret1", "2025-01-01"),
            seed_account("a@x.com", "short", "2025-13-01"),
            seed_account("no-at-sign", "secret1", "2025-01-01"),
            seed_account("  b@x.com", "secret1", "2025-01-01"),
            seed_account("b@x.com ", "secret1", "2025-01-01"),
        ]);

        let errors = validate_config(&config);
        let duplicate = |wanted: &str| {
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::DuplicateSeedEmail(email) if email == wanted))
        };
        assert!(duplicate("a@x.com"));
        assert!(duplicate("b@x.com"));
        assert!(errors.iter().any(
            |e| matches!(e, ValidationError::InvalidDate { value } if value == "2025-13-01")
        ));
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ValidationError::SeedAccountError { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_seed_secret_follows_configured_minimum() {
        let mut config = RawConfig::default();
        config.session.min_secret_length = Some(10);
        config.seed.accounts = Some(vec![seed_account("a@x.com", "secret1", "2025-01-01")]);

        assert_eq!(validate_config(&config).len(), 1);
    }

    #[test]
    fn test_bad_listen_addr() {
        let mut config = RawConfig::default();
        config.service.listen_addr = Some("localhost".into());

        let errors = validate_config(&config);
        assert!(matches!(errors[0], ValidationError::InvalidListenAddr(_)));
    }
}
