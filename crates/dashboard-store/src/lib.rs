//! Persistence layer for the dashboard service
//!
//! Provides:
//! - Record store (accounts, revenue events, category allocations)
//! - Key-value slots for session persistence (durable SQLite, ephemeral memory)
//! - Audit log (append-only)

mod audit;
mod memory;
mod records;
mod sqlite;
mod traits;

pub use audit::*;
pub use memory::*;
pub use records::*;
pub use sqlite::*;
pub use traits::*;

use dashboard_util::DashboardError;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate email: {0}")]
    DuplicateEmail(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<StoreError> for DashboardError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => DashboardError::DuplicateEmail(email),
            other => DashboardError::DataUnavailable(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
