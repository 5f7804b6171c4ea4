//! Record types owned by the store

use chrono::NaiveDate;
use dashboard_api::{PublicUser, SessionUser};
use dashboard_util::AccountId;
use serde::{Deserialize, Serialize};

/// A registered account, secret included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub full_name: String,
    pub email: String,
    pub secret: String,
    pub registered_on: NaiveDate,
    pub is_logged_in: bool,
}

impl Account {
    /// Redacted view (no secret, no login flag)
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
        }
    }

    /// Snapshot held by a session
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            is_logged_in: self.is_logged_in,
        }
    }
}

/// Candidate account for insertion; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub secret: String,
    pub registered_on: NaiveDate,
}

/// A dated revenue amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueEvent {
    pub date: NaiveDate,
    pub amount: f64,
}

/// A labelled category weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub label: String,
    pub weight: f64,
}

/// Seed account with a fixed id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAccount {
    pub id: AccountId,
    pub full_name: String,
    pub email: String,
    pub secret: String,
    pub registered_on: NaiveDate,
}

/// Initial dataset written on first start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    pub accounts: Vec<SeedAccount>,
    pub revenue: Vec<RevenueEvent>,
    pub categories: Vec<CategoryAllocation>,
}

/// Rows inserted by a seeding pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub accounts: usize,
    pub revenue_events: usize,
    pub categories: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.accounts == 0 && self.revenue_events == 0 && self.categories == 0
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl SeedData {
    /// Built-in demo dataset
    pub fn demo() -> Self {
        let account = |id: &str, name: &str, email: &str, secret: &str, on: NaiveDate| SeedAccount {
            id: AccountId::new(id),
            full_name: name.to_string(),
            email: email.to_string(),
            secret: secret.to_string(),
            registered_on: on,
        };

        let accounts = vec![
            account("user-1", "John Doe", "user@example.com", "password123", date(2025, 1, 15)),
            account("user-2", "Jane Smith", "jane@example.com", "password123", date(2025, 1, 28)),
            account("user-3", "Carlos Ruiz", "carlos@example.com", "password123", date(2025, 2, 9)),
            account("user-4", "Priya Patel", "priya@example.com", "password123", date(2025, 3, 3)),
            account("user-5", "Mei Chen", "mei@example.com", "password123", date(2025, 3, 21)),
            account("user-6", "Tom Becker", "tom@example.com", "password123", date(2025, 4, 11)),
        ];

        let revenue = [
            (date(2025, 1, 1), 4000.0),
            (date(2025, 2, 1), 3000.0),
            (date(2025, 3, 1), 5000.0),
            (date(2025, 4, 1), 4500.0),
            (date(2025, 5, 1), 6000.0),
            (date(2025, 6, 1), 5500.0),
        ]
        .into_iter()
        .map(|(date, amount)| RevenueEvent { date, amount })
        .collect();

        let categories = [
            ("Electronics", 400.0),
            ("Clothing", 300.0),
            ("Home Goods", 300.0),
            ("Books", 200.0),
            ("Sports", 100.0),
        ]
        .into_iter()
        .map(|(label, weight)| CategoryAllocation {
            label: label.to_string(),
            weight,
        })
        .collect();

        Self {
            accounts,
            revenue,
            categories,
        }
    }
}
