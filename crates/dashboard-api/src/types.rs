//! Shared types for the dashboard API

use chrono::NaiveDate;
use dashboard_util::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persistence lifetime policy governing a stored session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionTier {
    /// Lives until the process exits; subject to the inactivity watchdog
    Ephemeral,
    /// "Keep me logged in": survives restarts for the retention period
    Durable,
}

impl SessionTier {
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            SessionTier::Durable
        } else {
            SessionTier::Ephemeral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionTier::Ephemeral => "ephemeral",
            SessionTier::Durable => "durable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ephemeral" => Some(SessionTier::Ephemeral),
            "durable" => Some(SessionTier::Durable),
            _ => None,
        }
    }
}

impl fmt::Display for SessionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// User asked to log out
    Manual,
    /// Inactivity watchdog expired
    Inactivity,
}

impl LogoutReason {
    /// Where the client should navigate after this logout
    pub fn redirect_path(&self) -> &'static str {
        match self {
            LogoutReason::Manual => "/login",
            LogoutReason::Inactivity => "/login?autologgedout=true",
        }
    }
}

/// Kinds of user activity that reset the inactivity countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerMove,
    KeyPress,
    Scroll,
    Click,
}

/// Account as exposed after registration (no secret, no login flag)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: AccountId,
    pub email: String,
    pub full_name: String,
}

/// Snapshot of the authenticated account held by a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: AccountId,
    pub email: String,
    pub full_name: String,
    pub is_logged_in: bool,
}

impl SessionUser {
    /// Avatar initials: first letter of each name part, uppercased
    pub fn initials(&self) -> String {
        initials(&self.full_name)
    }
}

/// Initials for a display name, `"U"` when the name is blank
pub fn initials(full_name: &str) -> String {
    let letters: String = full_name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "U".to_string()
    } else {
        letters
    }
}

/// Headline dashboard metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsView {
    pub total_users: usize,
    /// Placeholder gauge, not a reproducible metric
    pub active_sessions: u32,
    pub sales_revenue: f64,
}

/// One point of the revenue time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// Registrations counted per `YYYY-MM` month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRegistrations {
    pub month: String,
    pub users: usize,
}

/// One slice of the category breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub name: String,
    pub value: f64,
}

/// Row of the accounts table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRow {
    pub id: AccountId,
    pub full_name: String,
    pub email: String,
    pub registration_date: NaiveDate,
    /// True only for the account held by the local session
    pub is_logged_in: bool,
}

/// Outcome of the navigation guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    Redirect,
}
