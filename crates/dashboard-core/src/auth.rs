//! Registration, login and logout

use dashboard_api::{LogoutReason, PublicUser, SessionTier};
use dashboard_store::{AuditEvent, AuditEventType, NewAccount, RecordStore};
use chrono::{DateTime, Local};
use dashboard_util::{AccountId, DashboardError, Result, SessionToken};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{Session, SessionStore};

/// Issues and revokes sessions for the client context.
///
/// The only writer of the session slots and of account login flags.
pub struct AuthService {
    store: Arc<dyn RecordStore>,
    sessions: SessionStore,
    min_secret_length: usize,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sessions: SessionStore,
        min_secret_length: usize,
    ) -> Self {
        Self {
            store,
            sessions,
            min_secret_length,
        }
    }

    fn audit(&self, event: AuditEventType) {
        if let Err(e) = self.store.append_audit(AuditEvent::new(event)) {
            warn!(error = %e, "Failed to append audit event");
        }
    }

    /// Create an account. Name and email are trimmed before checking.
    pub fn register(&self, full_name: &str, email: &str, secret: &str) -> Result<PublicUser> {
        let full_name = full_name.trim();
        let email = email.trim();

        if full_name.is_empty() || email.is_empty() || secret.is_empty() {
            return Err(DashboardError::validation("All fields are required"));
        }
        if !email.contains('@') {
            return Err(DashboardError::validation("Email address is not valid"));
        }
        if secret.chars().count() < self.min_secret_length {
            return Err(DashboardError::validation(format!(
                "Password must be at least {} characters",
                self.min_secret_length
            )));
        }

        let account = self.store.insert_account(NewAccount {
            full_name: full_name.to_string(),
            email: email.to_string(),
            secret: secret.to_string(),
            registered_on: dashboard_util::today(),
        })?;

        self.audit(AuditEventType::AccountRegistered {
            account_id: account.id.clone(),
            email: account.email.clone(),
        });

        info!(account_id = %account.id, "Account registered");
        Ok(account.to_public())
    }

    /// Authenticate and replace any existing session.
    ///
    /// Unknown email and wrong secret are the same failure.
    pub fn login(&self, email: &str, secret: &str, remember_me: bool) -> Result<Session> {
        let account = match self.store.find_account_by_email(email)? {
            Some(account) if account.secret == secret => account,
            _ => {
                self.audit(AuditEventType::LoginFailed {
                    email: email.to_string(),
                });
                info!("Login rejected");
                return Err(DashboardError::InvalidCredentials);
            }
        };

        let previous = self.current_session()?;
        self.store.set_login_flag(&account.id, true)?;

        let now = dashboard_util::now();
        let mut user = account.to_session_user();
        user.is_logged_in = true;

        let session = Session {
            token: SessionToken::mint(),
            user,
            tier: SessionTier::from_remember_me(remember_me),
            issued_at: now,
        };
        if let Err(e) = self.sessions.save(&session, now) {
            warn!(
                account_id = %account.id,
                error = %e,
                "Failed to store session, rolling back login"
            );
            self.rollback_login(&account.id, previous.as_ref(), now);
            return Err(e.into());
        }

        self.audit(AuditEventType::LoginSucceeded {
            account_id: account.id.clone(),
            tier: session.tier,
        });

        info!(account_id = %account.id, tier = %session.tier, "Login succeeded");
        Ok(session)
    }

    /// Put the slots and login flags back the way they were before a login
    /// whose session could not be stored. Both halves are attempted.
    fn rollback_login(
        &self,
        account_id: &AccountId,
        previous: Option<&Session>,
        now: DateTime<Local>,
    ) {
        let (slots, flag) = match previous {
            Some(previous) => (
                self.sessions.save(previous, now),
                self.store.set_login_flag(&previous.user.id, true),
            ),
            None => (
                self.sessions.clear(),
                self.store.set_login_flag(account_id, false),
            ),
        };

        if let Err(e) = slots {
            warn!(account_id = %account_id, error = %e, "Failed to restore session slots");
        }
        if let Err(e) = flag {
            warn!(account_id = %account_id, error = %e, "Failed to restore login flags");
        }
    }

    /// End the current session.
    ///
    /// Returns `None` without touching anything when there is no session.
    /// The session slots are cleared even if clearing the login flag fails;
    /// that failure is reported afterwards.
    pub fn logout(&self, reason: LogoutReason) -> Result<Option<LogoutReason>> {
        let Some(session) = self.current_session()? else {
            debug!(reason = ?reason, "Logout with no active session");
            return Ok(None);
        };

        let account_id = session.user.id;
        let flag_result = self.store.set_login_flag(&account_id, false);
        self.sessions.clear()?;

        if let Err(e) = flag_result {
            warn!(account_id = %account_id, error = %e, "Session cleared but login flag was not");
            return Err(e.into());
        }

        self.audit(AuditEventType::SessionEnded {
            account_id: account_id.clone(),
            reason,
        });

        info!(account_id = %account_id, reason = ?reason, "Session ended");
        Ok(Some(reason))
    }

    /// The session in whichever tier is populated
    pub fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.sessions.load(dashboard_util::now())?)
    }

    /// Load any persisted session at startup.
    ///
    /// When nothing survived, stale login flags from the previous run are
    /// cleared.
    pub fn restore(&self) -> Result<Option<Session>> {
        let session = self.current_session()?;

        match &session {
            Some(session) => {
                info!(
                    account_id = %session.user.id,
                    tier = %session.tier,
                    "Session restored"
                );
            }
            None => {
                let cleared = self.store.clear_login_flags()?;
                if cleared > 0 {
                    self.audit(AuditEventType::StalePresenceCleared { cleared });
                    info!(cleared, "Cleared stale login flags");
                }
            }
        }

        Ok(session)
    }
}
