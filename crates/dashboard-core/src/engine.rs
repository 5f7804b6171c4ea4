//! Client-context engine

use dashboard_api::{
    AccountRow, ActivityKind, CategorySlice, GuardView, LogoutReason, MetricsView,
    MonthlyRegistrations, PublicUser, RevenuePoint, SessionView,
};
use dashboard_config::Settings;
use dashboard_store::{AuditEvent, AuditEventType, KeyValueStore, MemoryKv, RecordStore};
use dashboard_util::{MonotonicInstant, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    Analytics, AuthService, CoreEvent, InactivityWatchdog, Session, SessionStore,
    guard_navigation,
};

/// The single client context the service maintains: auth, session slots,
/// inactivity watchdog and analytics over one record store.
pub struct DashboardEngine {
    store: Arc<dyn RecordStore>,
    auth: AuthService,
    analytics: Analytics,
    watchdog: InactivityWatchdog,
}

impl DashboardEngine {
    /// Create an engine over `store`, which also holds the durable session
    /// tier. The ephemeral tier starts empty, as after a process restart.
    pub fn new<S>(settings: &Settings, store: Arc<S>) -> Self
    where
        S: RecordStore + KeyValueStore + 'static,
    {
        let records: Arc<dyn RecordStore> = store.clone();
        let durable: Arc<dyn KeyValueStore> = store;

        let sessions = SessionStore::new(
            Arc::new(MemoryKv::new()),
            durable,
            settings.session.durable_retention,
        );

        info!(
            inactivity_timeout_secs = settings.session.inactivity_timeout.as_secs(),
            active_sessions = ?settings.analytics.active_sessions,
            "Engine initialized"
        );

        if let Err(e) = records.append_audit(AuditEvent::new(AuditEventType::ConfigLoaded {
            seed_accounts: settings.seed.accounts.len(),
        })) {
            warn!(error = %e, "Failed to append audit event");
        }

        Self {
            auth: AuthService::new(
                records.clone(),
                sessions,
                settings.session.min_secret_length,
            ),
            analytics: Analytics::new(records.clone(), settings.analytics.active_sessions),
            watchdog: InactivityWatchdog::new(settings.session.inactivity_timeout),
            store: records,
        }
    }

    /// Pick up a persisted session and arm the watchdog if it is ephemeral
    pub fn restore(&mut self, now_mono: MonotonicInstant) -> Result<Option<Session>> {
        let session = self.auth.restore()?;
        self.watchdog.sync(session.as_ref().map(|s| s.tier), now_mono);
        Ok(session)
    }

    pub fn register(&self, full_name: &str, email: &str, secret: &str) -> Result<PublicUser> {
        self.auth.register(full_name, email, secret)
    }

    /// Log in, replacing any current session. An ephemeral session gets a
    /// full inactivity window.
    pub fn login(
        &mut self,
        email: &str,
        secret: &str,
        remember_me: bool,
        now_mono: MonotonicInstant,
    ) -> Result<Session> {
        let session = self.auth.login(email, secret, remember_me)?;
        self.watchdog.disarm();
        self.watchdog.sync(Some(session.tier), now_mono);
        Ok(session)
    }

    /// End the current session. The watchdog is disarmed whatever the outcome.
    pub fn logout(&mut self, reason: LogoutReason) -> Result<Option<LogoutReason>> {
        self.watchdog.disarm();
        self.auth.logout(reason)
    }

    pub fn record_activity(&mut self, kind: ActivityKind, now_mono: MonotonicInstant) {
        if self.watchdog.is_armed() {
            debug!(kind = ?kind, "Activity resets inactivity countdown");
        }
        self.watchdog.on_activity(now_mono);
    }

    /// Advance the watchdog; ends the session on inactivity expiry
    pub fn tick(&mut self, now_mono: MonotonicInstant) -> Vec<CoreEvent> {
        let mut events = Vec::new();

        if !self.watchdog.tick(now_mono) {
            return events;
        }

        info!("Inactivity timeout reached");
        let reason = LogoutReason::Inactivity;

        let account_id = match self.auth.current_session() {
            Ok(session) => session.map(|s| s.user.id),
            Err(e) => {
                warn!(error = %e, "Failed to read session on inactivity expiry");
                None
            }
        };

        match self.auth.logout(reason) {
            Ok(Some(reason)) => {
                if let Some(account_id) = account_id {
                    events.push(CoreEvent::SessionEnded { account_id, reason });
                }
            }
            Ok(None) => debug!("Inactivity expiry with no session left"),
            Err(e) => {
                warn!(error = %e, "Inactivity logout failed");
                events.push(CoreEvent::LogoutFailed {
                    reason,
                    message: e.to_string(),
                });
            }
        }

        events
    }

    /// Stop the countdown for shutdown; the session itself is left in place
    pub fn teardown(&mut self) {
        self.watchdog.disarm();
        debug!("Engine torn down");
    }

    pub fn current_session(&self) -> Result<Option<Session>> {
        self.auth.current_session()
    }

    /// Session as presented to the client, with the inactivity countdown
    pub fn session_view(&self, now_mono: MonotonicInstant) -> Result<Option<SessionView>> {
        Ok(self.current_session()?.map(|session| SessionView {
            initials: session.user.initials(),
            inactivity_remaining_secs: self.watchdog.remaining(now_mono).map(|d| d.as_secs()),
            user: session.user,
            tier: session.tier,
        }))
    }

    pub fn guard(&self, path: &str) -> Result<GuardView> {
        let has_session = self.current_session()?.is_some();
        Ok(guard_navigation(path, has_session))
    }

    pub fn watchdog(&self) -> &InactivityWatchdog {
        &self.watchdog
    }

    pub fn metrics(&self) -> Result<MetricsView> {
        self.analytics.metrics()
    }

    pub fn revenue_series(&self) -> Result<Vec<RevenuePoint>> {
        self.analytics.revenue_series()
    }

    pub fn registrations_by_month(&self) -> Result<Vec<MonthlyRegistrations>> {
        self.analytics.registrations_by_month()
    }

    pub fn category_breakdown(&self) -> Result<Vec<CategorySlice>> {
        self.analytics.category_breakdown()
    }

    /// Accounts table as seen by the local session
    pub fn accounts_view(&self) -> Result<Vec<AccountRow>> {
        let viewer = self.current_session()?.map(|s| s.user.id);
        self.analytics.accounts_view(viewer.as_ref())
    }

    pub fn store_healthy(&self) -> bool {
        self.store.is_healthy()
    }
}
