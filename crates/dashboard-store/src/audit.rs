//! Audit event types

use chrono::{DateTime, Local};
use dashboard_api::{LogoutReason, SessionTier};
use dashboard_util::AccountId;
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Service started
    ServiceStarted,

    /// Service stopped
    ServiceStopped,

    /// Configuration loaded
    ConfigLoaded { seed_accounts: usize },

    /// New account registered
    AccountRegistered { account_id: AccountId, email: String },

    /// Login succeeded
    LoginSucceeded {
        account_id: AccountId,
        tier: SessionTier,
    },

    /// Login rejected (no reason recorded)
    LoginFailed { email: String },

    /// Session ended
    SessionEnded {
        account_id: AccountId,
        reason: LogoutReason,
    },

    /// Login flags cleared because no session survived a restart
    StalePresenceCleared { cleared: usize },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: dashboard_util::now(),
            event,
        }
    }
}
