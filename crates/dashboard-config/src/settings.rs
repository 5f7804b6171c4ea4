//! Validated settings structures

use crate::schema::{RawAnalyticsConfig, RawConfig, RawSeed, RawServiceConfig, RawSessionConfig};
use crate::validation::DEFAULT_MIN_SECRET_LENGTH;
use dashboard_store::{CategoryAllocation, RevenueEvent, SeedAccount, SeedData};
use dashboard_util::{AccountId, parse_date};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Default HTTP listen port
pub const DEFAULT_LISTEN_PORT: u16 = 3000;

/// Default inactivity timeout for ephemeral sessions
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(60);

/// Default durable session retention, in days
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

/// Default bounds of the random active-session placeholder
pub const DEFAULT_RANDOM_MIN: u32 = 50;
pub const DEFAULT_RANDOM_MAX: u32 = 500;

/// Validated settings ready for use by the service
#[derive(Debug, Clone)]
pub struct Settings {
    pub service: ServiceConfig,
    pub session: SessionPolicy,
    pub analytics: AnalyticsPolicy,
    pub seed: SeedData,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            session: SessionPolicy::from_raw(raw.session),
            analytics: AnalyticsPolicy::from_raw(raw.analytics),
            seed: convert_seed(raw.seed),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            session: SessionPolicy::default(),
            analytics: AnalyticsPolicy::default(),
            seed: SeedData::demo(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: raw
                .listen_addr
                .and_then(|addr| addr.parse().ok())
                .unwrap_or(defaults.listen_addr),
            data_dir: raw.data_dir.unwrap_or(defaults.data_dir),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_LISTEN_PORT)),
            data_dir: dashboard_util::default_data_dir(),
        }
    }
}

/// Session lifecycle policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Inactivity window for ephemeral sessions
    pub inactivity_timeout: Duration,

    /// Wall-clock lifetime of a durable session
    pub durable_retention: chrono::Duration,

    /// Minimum secret length (in characters) accepted at registration
    pub min_secret_length: usize,
}

impl SessionPolicy {
    fn from_raw(raw: RawSessionConfig) -> Self {
        let defaults = Self::default();
        Self {
            inactivity_timeout: raw
                .inactivity_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.inactivity_timeout),
            durable_retention: raw
                .durable_retention_days
                .map(|days| chrono::Duration::days(days as i64))
                .unwrap_or(defaults.durable_retention),
            min_secret_length: raw.min_secret_length.unwrap_or(defaults.min_secret_length),
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            durable_retention: chrono::Duration::days(DEFAULT_RETENTION_DAYS as i64),
            min_secret_length: DEFAULT_MIN_SECRET_LENGTH,
        }
    }
}

/// How the active-sessions metric is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSessionsMode {
    /// Placeholder drawn uniformly from `min..=max` on every read
    Random { min: u32, max: u32 },

    /// Number of accounts currently flagged as logged in
    LoggedIn,
}

impl Default for ActiveSessionsMode {
    fn default() -> Self {
        ActiveSessionsMode::Random {
            min: DEFAULT_RANDOM_MIN,
            max: DEFAULT_RANDOM_MAX,
        }
    }
}

/// Analytics policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsPolicy {
    pub active_sessions: ActiveSessionsMode,
}

impl AnalyticsPolicy {
    fn from_raw(raw: RawAnalyticsConfig) -> Self {
        let active_sessions = match raw.active_sessions.as_deref() {
            Some("logged_in") => ActiveSessionsMode::LoggedIn,
            _ => ActiveSessionsMode::Random {
                min: raw.random_min.unwrap_or(DEFAULT_RANDOM_MIN),
                max: raw.random_max.unwrap_or(DEFAULT_RANDOM_MAX),
            },
        };
        Self { active_sessions }
    }
}

fn convert_seed(raw: RawSeed) -> SeedData {
    let demo = SeedData::demo();

    let accounts = match raw.accounts {
        Some(accounts) => accounts
            .into_iter()
            .map(|a| SeedAccount {
                id: a.id.map(AccountId::new).unwrap_or_else(AccountId::generate),
                full_name: a.full_name.trim().to_string(),
                email: a.email.trim().to_string(),
                secret: a.secret,
                registered_on: parse_date(&a.registered_on).unwrap_or_default(),
            })
            .collect(),
        None => demo.accounts,
    };

    let revenue = match raw.revenue {
        Some(events) => events
            .into_iter()
            .map(|e| RevenueEvent {
                date: parse_date(&e.date).unwrap_or_default(),
                amount: e.amount,
            })
            .collect(),
        None => demo.revenue,
    };

    let categories = match raw.categories {
        Some(categories) => categories
            .into_iter()
            .map(|c| CategoryAllocation {
                label: c.label,
                weight: c.weight,
            })
            .collect(),
        None => demo.categories,
    };

    SeedData {
        accounts,
        revenue,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawCategory;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_raw(RawConfig::default());

        assert_eq!(settings.service.listen_addr.port(), 3000);
        assert_eq!(settings.session.inactivity_timeout, Duration::from_secs(60));
        assert_eq!(settings.session.durable_retention, chrono::Duration::days(7));
        assert_eq!(settings.session.min_secret_length, 6);
        assert_eq!(
            settings.analytics.active_sessions,
            ActiveSessionsMode::Random { min: 50, max: 500 }
        );
        assert_eq!(settings.seed, SeedData::demo());
    }

    #[test]
    fn test_partial_seed_override() {
        let mut raw = RawConfig::default();
        raw.seed.categories = Some(vec![RawCategory {
            label: "Toys".into(),
            weight: 1.0,
        }]);

        let settings = Settings::from_raw(raw);
        assert_eq!(settings.seed.categories.len(), 1);
        assert_eq!(settings.seed.categories[0].label, "Toys");
        assert_eq!(settings.seed.accounts, SeedData::demo().accounts);
    }

    #[test]
    fn test_logged_in_mode() {
        let mut raw = RawConfig::default();
        raw.analytics.active_sessions = Some("logged_in".into());

        let settings = Settings::from_raw(raw);
        assert_eq!(settings.analytics.active_sessions, ActiveSessionsMode::LoggedIn);
    }
}
