//! Store trait definitions

use chrono::{DateTime, Local};
use dashboard_util::AccountId;

use crate::{
    Account, AuditEvent, CategoryAllocation, NewAccount, RevenueEvent, SeedData, SeedReport,
    StoreResult,
};

/// Record store: the sole owner of accounts, revenue events and categories
pub trait RecordStore: Send + Sync {
    // Accounts

    /// All accounts in registration order
    fn list_accounts(&self) -> StoreResult<Vec<Account>>;

    /// Exact-match lookup by email
    fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Insert a new account, failing with `DuplicateEmail` if the email is taken
    fn insert_account(&self, candidate: NewAccount) -> StoreResult<Account>;

    /// Set an account's login flag.
    ///
    /// `true` is an exclusive login: afterwards every account's flag equals
    /// `account.id == account_id`. `false` clears only the given account.
    fn set_login_flag(&self, account_id: &AccountId, value: bool) -> StoreResult<()>;

    /// Clear every login flag, returning how many were set
    fn clear_login_flags(&self) -> StoreResult<usize>;

    // Read-only datasets

    /// Revenue events in insertion order
    fn list_revenue_events(&self) -> StoreResult<Vec<RevenueEvent>>;

    /// Category allocations in insertion order
    fn list_category_allocations(&self) -> StoreResult<Vec<CategoryAllocation>>;

    /// Populate each empty collection from the seed
    fn seed_if_empty(&self, seed: &SeedData) -> StoreResult<SeedReport>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// Named string slots with optional expiry
pub trait KeyValueStore: Send + Sync {
    /// Read a slot; expired values read as absent and are purged
    fn get(&self, key: &str, now: DateTime<Local>) -> StoreResult<Option<String>>;

    /// Write a slot, replacing any previous value
    fn put(&self, key: &str, value: &str, expires_at: Option<DateTime<Local>>) -> StoreResult<()>;

    /// Remove a slot (no-op if absent)
    fn remove(&self, key: &str) -> StoreResult<()>;
}
