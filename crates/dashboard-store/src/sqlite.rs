//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate};
use dashboard_util::{AccountId, format_date, parse_date};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{
    Account, AuditEvent, AuditEventType, CategoryAllocation, KeyValueStore, NewAccount,
    RecordStore, RevenueEvent, SeedData, SeedReport, StoreError, StoreResult,
};

const ACCOUNT_COLUMNS: &str = "id, full_name, email, secret, registered_on, is_logged_in";

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Accounts (seq preserves registration order)
            CREATE TABLE IF NOT EXISTS accounts (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                secret TEXT NOT NULL,
                registered_on TEXT NOT NULL,
                is_logged_in INTEGER NOT NULL DEFAULT 0
            );

            -- Revenue events (read-only after seeding)
            CREATE TABLE IF NOT EXISTS revenue_events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL
            );

            -- Category allocations (read-only after seeding)
            CREATE TABLE IF NOT EXISTS category_allocations (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL,
                weight REAL NOT NULL
            );

            -- Durable key-value slots
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at TEXT
            );

            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

type AccountRow = (String, String, String, String, String, bool);

fn read_account_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn account_from_row(row: AccountRow) -> StoreResult<Account> {
    let (id, full_name, email, secret, registered_on, is_logged_in) = row;
    Ok(Account {
        id: AccountId::new(id),
        full_name,
        email,
        secret,
        registered_on: decode_date(&registered_on)?,
        is_logged_in,
    })
}

fn decode_date(value: &str) -> StoreResult<NaiveDate> {
    parse_date(value).ok_or_else(|| StoreError::Serialization(format!("invalid date '{}'", value)))
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn table_is_empty(tx: &Transaction<'_>, table: &str) -> StoreResult<bool> {
    let count: i64 = tx.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count == 0)
}

impl RecordStore for SqliteStore {
    fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts ORDER BY seq",
            ACCOUNT_COLUMNS
        ))?;
        let rows = stmt.query_map([], read_account_row)?;

        let mut accounts = Vec::new();
        for row in rows {
            accounts.push(account_from_row(row?)?);
        }
        Ok(accounts)
    }

    fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                &format!("SELECT {} FROM accounts WHERE email = ?", ACCOUNT_COLUMNS),
                [email],
                read_account_row,
            )
            .optional()?;

        row.map(account_from_row).transpose()
    }

    fn insert_account(&self, candidate: NewAccount) -> StoreResult<Account> {
        let conn = self.conn()?;

        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?)",
            [&candidate.email],
            |row| row.get(0),
        )?;
        if taken {
            return Err(StoreError::DuplicateEmail(candidate.email));
        }

        let account = Account {
            id: AccountId::generate(),
            full_name: candidate.full_name,
            email: candidate.email,
            secret: candidate.secret,
            registered_on: candidate.registered_on,
            is_logged_in: false,
        };

        conn.execute(
            "INSERT INTO accounts (id, full_name, email, secret, registered_on, is_logged_in)
             VALUES (?, ?, ?, ?, ?, 0)",
            params![
                account.id.as_str(),
                account.full_name,
                account.email,
                account.secret,
                format_date(account.registered_on),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail(account.email.clone())
            } else {
                e.into()
            }
        })?;

        debug!(account_id = %account.id, "Account inserted");
        Ok(account)
    }

    fn set_login_flag(&self, account_id: &AccountId, value: bool) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?)",
            [account_id.as_str()],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::NotFound(format!("account {}", account_id)));
        }

        if value {
            // Exclusive login: one statement rewrites every flag
            tx.execute(
                "UPDATE accounts SET is_logged_in = (id = ?)",
                [account_id.as_str()],
            )?;
        } else {
            tx.execute(
                "UPDATE accounts SET is_logged_in = 0 WHERE id = ?",
                [account_id.as_str()],
            )?;
        }

        tx.commit()?;
        debug!(account_id = %account_id, value, "Login flag set");
        Ok(())
    }

    fn clear_login_flags(&self) -> StoreResult<usize> {
        let conn = self.conn()?;
        let cleared = conn.execute(
            "UPDATE accounts SET is_logged_in = 0 WHERE is_logged_in = 1",
            [],
        )?;
        Ok(cleared)
    }

    fn list_revenue_events(&self) -> StoreResult<Vec<RevenueEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT date, amount FROM revenue_events ORDER BY seq")?;
        let rows = stmt.query_map([], |row| {
            let date: String = row.get(0)?;
            let amount: f64 = row.get(1)?;
            Ok((date, amount))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (date, amount) = row?;
            events.push(RevenueEvent {
                date: decode_date(&date)?,
                amount,
            });
        }
        Ok(events)
    }

    fn list_category_allocations(&self) -> StoreResult<Vec<CategoryAllocation>> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare("SELECT label, weight FROM category_allocations ORDER BY seq")?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryAllocation {
                label: row.get(0)?,
                weight: row.get(1)?,
            })
        })?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn seed_if_empty(&self, seed: &SeedData) -> StoreResult<SeedReport> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut report = SeedReport::default();

        if table_is_empty(&tx, "accounts")? {
            for account in &seed.accounts {
                tx.execute(
                    "INSERT INTO accounts
                        (id, full_name, email, secret, registered_on, is_logged_in)
                     VALUES (?, ?, ?, ?, ?, 0)",
                    params![
                        account.id.as_str(),
                        account.full_name,
                        account.email,
                        account.secret,
                        format_date(account.registered_on),
                    ],
                )?;
            }
            report.accounts = seed.accounts.len();
        }

        if table_is_empty(&tx, "revenue_events")? {
            for event in &seed.revenue {
                tx.execute(
                    "INSERT INTO revenue_events (date, amount) VALUES (?, ?)",
                    params![format_date(event.date), event.amount],
                )?;
            }
            report.revenue_events = seed.revenue.len();
        }

        if table_is_empty(&tx, "category_allocations")? {
            for category in &seed.categories {
                tx.execute(
                    "INSERT INTO category_allocations (label, weight) VALUES (?, ?)",
                    params![category.label, category.weight],
                )?;
            }
            report.categories = seed.categories.len();
        }

        tx.commit()?;

        if !report.is_empty() {
            info!(
                accounts = report.accounts,
                revenue_events = report.revenue_events,
                categories = report.categories,
                "Store seeded"
            );
        }
        Ok(report)
    }

    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Local))
                .unwrap_or_else(|_| dashboard_util::now());
            let event: AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str, now: DateTime<Local>) -> StoreResult<Option<String>> {
        let conn = self.conn()?;

        let row: Option<(String, Option<String>)> = conn
            .query_row(
                "SELECT value, expires_at FROM kv WHERE key = ?",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };

        if let Some(expires_at) = expires_at {
            let expired = DateTime::parse_from_rfc3339(&expires_at)
                .map(|dt| dt.with_timezone(&Local) <= now)
                .unwrap_or(true);
            if expired {
                conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
                debug!(key, "Expired slot purged");
                return Ok(None);
            }
        }

        Ok(Some(value))
    }

    fn put(&self, key: &str, value: &str, expires_at: Option<DateTime<Local>>) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO kv (key, value, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
            "#,
            params![key, value, expires_at.map(|dt| dt.to_rfc3339())],
        )?;

        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeedAccount;
    use chrono::Duration;

    fn candidate(email: &str) -> NewAccount {
        NewAccount {
            full_name: "Ann Example".into(),
            email: email.into(),
            secret: "secret1".into(),
            registered_on: NaiveDate::from_ymd_opt(2025, 5, 4).unwrap(),
        }
    }

    fn logged_in(store: &SqliteStore) -> Vec<AccountId> {
        store
            .list_accounts()
            .unwrap()
            .into_iter()
            .filter(|a| a.is_logged_in)
            .map(|a| a.id)
            .collect()
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
        assert!(store.list_accounts().unwrap().is_empty());
    }

    #[test]
    fn test_insert_and_find_account() {
        let store = SqliteStore::in_memory().unwrap();

        let inserted = store.insert_account(candidate("a@x.com")).unwrap();
        assert!(!inserted.is_logged_in);

        let found = store.find_account_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(found, inserted);

        // Exact match only
        assert!(store.find_account_by_email("A@X.COM").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = SqliteStore::in_memory().unwrap();

        store.insert_account(candidate("a@x.com")).unwrap();
        let result = store.insert_account(candidate("a@x.com"));

        assert!(matches!(result, Err(StoreError::DuplicateEmail(email)) if email == "a@x.com"));
        assert_eq!(store.list_accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_exclusive_login_flag() {
        let store = SqliteStore::in_memory().unwrap();
        let a = store.insert_account(candidate("a@x.com")).unwrap();
        let b = store.insert_account(candidate("b@x.com")).unwrap();
        let c = store.insert_account(candidate("c@x.com")).unwrap();

        for id in [&a.id, &b.id, &c.id, &a.id] {
            store.set_login_flag(id, true).unwrap();
            assert_eq!(logged_in(&store), vec![id.clone()]);
        }

        store.set_login_flag(&a.id, false).unwrap();
        assert!(logged_in(&store).is_empty());
    }

    #[test]
    fn test_login_flag_unknown_account() {
        let store = SqliteStore::in_memory().unwrap();
        let a = store.insert_account(candidate("a@x.com")).unwrap();
        store.set_login_flag(&a.id, true).unwrap();

        let result = store.set_login_flag(&AccountId::new("user-missing"), true);
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        // Nothing changed
        assert_eq!(logged_in(&store), vec![a.id]);
    }

    #[test]
    fn test_clear_login_flags() {
        let store = SqliteStore::in_memory().unwrap();
        let a = store.insert_account(candidate("a@x.com")).unwrap();
        store.set_login_flag(&a.id, true).unwrap();

        assert_eq!(store.clear_login_flags().unwrap(), 1);
        assert_eq!(store.clear_login_flags().unwrap(), 0);
    }

    #[test]
    fn test_seed_only_when_empty() {
        let store = SqliteStore::in_memory().unwrap();
        let seed = SeedData::demo();

        let report = store.seed_if_empty(&seed).unwrap();
        assert_eq!(report.accounts, seed.accounts.len());
        assert_eq!(report.revenue_events, seed.revenue.len());
        assert_eq!(report.categories, seed.categories.len());

        let again = store.seed_if_empty(&seed).unwrap();
        assert!(again.is_empty());
        assert_eq!(store.list_accounts().unwrap().len(), seed.accounts.len());

        // Insertion order preserved
        let labels: Vec<_> = store
            .list_category_allocations()
            .unwrap()
            .into_iter()
            .map(|c| c.label)
            .collect();
        let expected: Vec<_> = seed.categories.iter().map(|c| c.label.clone()).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_seed_skips_populated_accounts() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert_account(candidate("a@x.com")).unwrap();

        let seed = SeedData {
            accounts: vec![SeedAccount {
                id: AccountId::new("user-1"),
                full_name: "John Doe".into(),
                email: "user@example.com".into(),
                secret: "password123".into(),
                registered_on: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            }],
            ..SeedData::default()
        };

        let report = store.seed_if_empty(&seed).unwrap();
        assert_eq!(report.accounts, 0);
        assert!(store.find_account_by_email("user@example.com").unwrap().is_none());
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_account(candidate("a@x.com")).unwrap();
            store.put("session", "{}", None).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert!(store.find_account_by_email("a@x.com").unwrap().is_some());
        assert_eq!(
            store.get("session", dashboard_util::now()).unwrap().as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_kv_expiry() {
        let store = SqliteStore::in_memory().unwrap();
        let now = dashboard_util::now();

        store
            .put("session", "durable", Some(now + Duration::days(7)))
            .unwrap();
        assert!(store.get("session", now + Duration::days(6)).unwrap().is_some());
        assert!(store.get("session", now + Duration::days(7)).unwrap().is_none());
        assert!(store.get("session", now).unwrap().is_none());
    }

    #[test]
    fn test_audit_log() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .append_audit(AuditEvent::new(AuditEventType::ServiceStarted))
            .unwrap();
        store
            .append_audit(AuditEvent::new(AuditEventType::LoginFailed {
                email: "a@x.com".into(),
            }))
            .unwrap();

        let events = store.recent_audits(10).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].event, AuditEventType::LoginFailed { .. }));
        assert!(matches!(events[1].event, AuditEventType::ServiceStarted));
    }
}
