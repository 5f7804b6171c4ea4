//! Time utilities for the dashboard service
//!
//! Provides both monotonic time (for inactivity countdowns) and
//! wall-clock time (for registration dates and slot retention).
//!
//! # Mock Time for Development
//!
//! In debug builds, the `DASHBOARD_MOCK_TIME` environment variable can be set
//! to override the wall clock. Useful for seeding registrations into a
//! particular month or checking durable-slot retention.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! ```bash
//! DASHBOARD_MOCK_TIME="2025-12-25 14:30:00" dashboardd
//! ```

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "DASHBOARD_MOCK_TIME";

/// Format accepted by `DASHBOARD_MOCK_TIME`
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Calendar date format used on the wire and in the store
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Offset between mock time and real time at process start.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // Internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match parse_mock_time(&mock_time_str) {
                    Some(mock_dt) => {
                        let offset = mock_dt.signed_duration_since(chrono::Local::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    None => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = MOCK_TIME_FORMAT,
                            "Invalid mock time"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Parse a mock time string in the local timezone
pub fn parse_mock_time(value: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(value, MOCK_TIME_FORMAT).ok()?;
    Local.from_local_datetime(&naive).single()
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // The wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Today's date at day granularity
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Format a calendar date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Year-month bucket key (`YYYY-MM`) for a date
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Represents a point in monotonic time for countdown enforcement.
/// This is immune to wall-clock changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicInstant(Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    /// Returns duration until `self`, or zero if `self` is in the past
    pub fn saturating_duration_until(&self, from: MonotonicInstant) -> Duration {
        if self.0 > from.0 {
            self.0.duration_since(from.0)
        } else {
            Duration::ZERO
        }
    }
}

impl MonotonicInstant {
    /// Add `duration`, stopping at the latest representable instant
    /// instead of overflowing.
    pub fn saturating_add(self, duration: Duration) -> MonotonicInstant {
        let mut instant = self.0;
        let mut remaining = duration;
        let mut step = duration;

        while !remaining.is_zero() && !step.is_zero() {
            step = step.min(remaining);
            match instant.checked_add(step) {
                Some(next) => {
                    instant = next;
                    remaining -= step;
                }
                None => step /= 2,
            }
        }

        MonotonicInstant(instant)
    }
}

impl std::ops::Add<Duration> for MonotonicInstant {
    type Output = MonotonicInstant;

    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

/// Format a duration as a human-readable string
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
    }

    #[test]
    fn test_monotonic_instant_arithmetic() {
        let t1 = MonotonicInstant::now();
        let t2 = t1 + Duration::from_secs(60);

        assert!(t2 > t1);
        assert_eq!(t2.saturating_duration_until(t1), Duration::from_secs(60));
        assert_eq!(t1.saturating_duration_until(t2), Duration::ZERO);
    }

    #[test]
    fn test_monotonic_instant_add_saturates() {
        let t1 = MonotonicInstant::now();
        let far = t1 + Duration::MAX;

        assert!(far > t1);
        assert_eq!(far + Duration::from_secs(1), far);
        assert_eq!(t1.saturating_add(Duration::ZERO), t1);
    }

    #[test]
    fn test_date_round_trip_and_month_key() {
        let date = parse_date("2025-03-09").unwrap();
        assert_eq!(format_date(date), "2025-03-09");
        assert_eq!(month_key(date), "2025-03");
        assert!(parse_date("2025/03/09").is_none());
    }

    #[test]
    fn test_now_returns_time() {
        let t = now();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
        assert_eq!(today(), t.date_naive());
    }

    #[test]
    fn test_parse_mock_time() {
        let parsed = parse_mock_time("2025-12-25 14:30:00").unwrap();
        assert_eq!(parsed.format(MOCK_TIME_FORMAT).to_string(), "2025-12-25 14:30:00");

        for invalid in ["2025-12-25", "2025-12-25T14:30:00", "", "not a date"] {
            assert!(parse_mock_time(invalid).is_none(), "{invalid:?} should be rejected");
        }
    }
}
