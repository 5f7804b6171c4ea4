//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Session lifecycle settings
    #[serde(default)]
    pub session: RawSessionConfig,

    /// Analytics settings
    #[serde(default)]
    pub analytics: RawAnalyticsConfig,

    /// Seed dataset; the built-in demo data is used for anything omitted
    #[serde(default)]
    pub seed: RawSeed,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// HTTP listen address (default: 127.0.0.1:3000)
    pub listen_addr: Option<String>,

    /// Data directory for the store
    pub data_dir: Option<PathBuf>,
}

/// Session lifecycle settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSessionConfig {
    /// Seconds of inactivity before an ephemeral session is ended
    pub inactivity_timeout_seconds: Option<u64>,

    /// Days a durable session survives
    pub durable_retention_days: Option<u64>,

    /// Minimum secret length accepted at registration
    pub min_secret_length: Option<usize>,
}

/// Analytics settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAnalyticsConfig {
    /// "random" (default) or "logged_in"
    pub active_sessions: Option<String>,

    /// Lower bound for the random placeholder
    pub random_min: Option<u32>,

    /// Upper bound for the random placeholder
    pub random_max: Option<u32>,
}

/// Seed dataset overrides
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSeed {
    pub accounts: Option<Vec<RawSeedAccount>>,
    pub revenue: Option<Vec<RawRevenueEvent>>,
    pub categories: Option<Vec<RawCategory>>,
}

/// Seed account
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSeedAccount {
    /// Stable id; generated when omitted
    pub id: Option<String>,

    pub full_name: String,

    pub email: String,

    #[serde(alias = "password")]
    pub secret: String,

    /// Registration date (YYYY-MM-DD)
    pub registered_on: String,
}

/// Seed revenue event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawRevenueEvent {
    /// Date (YYYY-MM-DD)
    pub date: String,

    pub amount: f64,
}

/// Seed category allocation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawCategory {
    pub label: String,

    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_schema() {
        let toml_str = r#"
            config_version = 1

            [service]
            listen_addr = "0.0.0.0:8080"
            data_dir = "/tmp/dashboard"

            [session]
            inactivity_timeout_seconds = 120

            [analytics]
            active_sessions = "logged_in"

            [[seed.accounts]]
            full_name = "Ann Example"
            email = "ann@example.com"
            password = "secret1"
            registered_on = "2025-05-04"

            [[seed.categories]]
            label = "Books"
            weight = 2.5
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.listen_addr.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(config.session.inactivity_timeout_seconds, Some(120));
        assert_eq!(config.session.durable_retention_days, None);

        let accounts = config.seed.accounts.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].secret, "secret1");
        assert!(config.seed.revenue.is_none());
    }

    #[test]
    fn sections_are_optional() {
        let config: RawConfig = toml::from_str("config_version = 1").unwrap();
        assert!(config.service.data_dir.is_none());
        assert!(config.analytics.active_sessions.is_none());
        assert!(config.seed.accounts.is_none());
    }
}
