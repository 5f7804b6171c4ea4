//! Session value and its two-tier persistence

use chrono::{DateTime, Local};
use dashboard_api::{SessionTier, SessionUser};
use dashboard_store::{KeyValueStore, StoreResult};
use dashboard_util::SessionToken;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Slot holding the serialized session in either tier
pub const SESSION_SLOT_KEY: &str = "session";

/// Slot naming the authoritative tier
pub const TIER_FLAG_KEY: &str = "session_tier";

/// An authenticated session held by the client context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub user: SessionUser,
    pub tier: SessionTier,
    pub issued_at: DateTime<Local>,
}

/// Writes one `Session` through to an ephemeral slot, a durable slot and a
/// tier flag. The flag lives in the durable tier.
pub struct SessionStore {
    ephemeral: Arc<dyn KeyValueStore>,
    durable: Arc<dyn KeyValueStore>,
    retention: chrono::Duration,
}

impl SessionStore {
    pub fn new(
        ephemeral: Arc<dyn KeyValueStore>,
        durable: Arc<dyn KeyValueStore>,
        retention: chrono::Duration,
    ) -> Self {
        Self {
            ephemeral,
            durable,
            retention,
        }
    }

    fn tier_store(&self, tier: SessionTier) -> &dyn KeyValueStore {
        match tier {
            SessionTier::Ephemeral => self.ephemeral.as_ref(),
            SessionTier::Durable => self.durable.as_ref(),
        }
    }

    fn read_slot(&self, tier: SessionTier, now: DateTime<Local>) -> StoreResult<Option<Session>> {
        let store = self.tier_store(tier);
        let Some(raw) = store.get(SESSION_SLOT_KEY, now)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(tier = %tier, error = %e, "Discarding unreadable session slot");
                store.remove(SESSION_SLOT_KEY)?;
                Ok(None)
            }
        }
    }

    /// Load the current session, if any.
    ///
    /// The flag picks the slot. A flag naming an empty slot is stale and is
    /// cleared. Without a flag, whichever slot is populated wins (ephemeral
    /// first).
    pub fn load(&self, now: DateTime<Local>) -> StoreResult<Option<Session>> {
        let flag = self
            .durable
            .get(TIER_FLAG_KEY, now)?
            .and_then(|value| SessionTier::parse(&value));

        match flag {
            Some(tier) => {
                let session = self.read_slot(tier, now)?;
                if session.is_none() {
                    debug!(tier = %tier, "Tier flag names an empty slot; clearing it");
                    self.durable.remove(TIER_FLAG_KEY)?;
                }
                Ok(session)
            }
            None => match self.read_slot(SessionTier::Ephemeral, now)? {
                Some(session) => Ok(Some(session)),
                None => self.read_slot(SessionTier::Durable, now),
            },
        }
    }

    /// Store the session in its tier, empty the other tier and set the flag
    pub fn save(&self, session: &Session, now: DateTime<Local>) -> StoreResult<()> {
        let value = serde_json::to_string(session)?;

        match session.tier {
            SessionTier::Ephemeral => {
                self.ephemeral.put(SESSION_SLOT_KEY, &value, None)?;
                self.durable.remove(SESSION_SLOT_KEY)?;
            }
            SessionTier::Durable => {
                self.durable
                    .put(SESSION_SLOT_KEY, &value, Some(now + self.retention))?;
                self.ephemeral.remove(SESSION_SLOT_KEY)?;
            }
        }

        self.durable
            .put(TIER_FLAG_KEY, session.tier.as_str(), None)?;
        debug!(tier = %session.tier, "Session stored");
        Ok(())
    }

    /// Remove both slots and the flag. Every removal is attempted; the first
    /// failure is returned.
    pub fn clear(&self) -> StoreResult<()> {
        let results = [
            self.ephemeral.remove(SESSION_SLOT_KEY),
            self.durable.remove(SESSION_SLOT_KEY),
            self.durable.remove(TIER_FLAG_KEY),
        ];
        results.into_iter().collect::<StoreResult<Vec<()>>>()?;
        debug!("Session slots cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_store::{MemoryKv, SqliteStore};
    use dashboard_util::AccountId;

    fn make_session(tier: SessionTier) -> Session {
        Session {
            token: SessionToken::mint(),
            user: SessionUser {
                id: AccountId::new("user-1"),
                email: "user@example.com".into(),
                full_name: "John Doe".into(),
                is_logged_in: true,
            },
            tier,
            issued_at: dashboard_util::now(),
        }
    }

    fn make_store() -> (SessionStore, Arc<MemoryKv>, Arc<SqliteStore>) {
        let ephemeral = Arc::new(MemoryKv::new());
        let durable = Arc::new(SqliteStore::in_memory().unwrap());
        let store = SessionStore::new(
            ephemeral.clone(),
            durable.clone(),
            chrono::Duration::days(7),
        );
        (store, ephemeral, durable)
    }

    #[test]
    fn test_save_and_load_each_tier() {
        let (store, ephemeral, durable) = make_store();
        let now = dashboard_util::now();

        let session = make_session(SessionTier::Ephemeral);
        store.save(&session, now).unwrap();
        assert_eq!(store.load(now).unwrap(), Some(session));
        assert!(durable.get(SESSION_SLOT_KEY, now).unwrap().is_none());

        // Switching tier empties the other slot
        let session = make_session(SessionTier::Durable);
        store.save(&session, now).unwrap();
        assert_eq!(store.load(now).unwrap(), Some(session));
        assert!(ephemeral.get(SESSION_SLOT_KEY, now).unwrap().is_none());
        assert_eq!(
            durable.get(TIER_FLAG_KEY, now).unwrap().as_deref(),
            Some("durable")
        );
    }

    #[test]
    fn test_durable_session_expires_after_retention() {
        let (store, _, durable) = make_store();
        let now = dashboard_util::now();

        store.save(&make_session(SessionTier::Durable), now).unwrap();
        assert!(store.load(now + chrono::Duration::days(6)).unwrap().is_some());
        assert!(store.load(now + chrono::Duration::days(8)).unwrap().is_none());

        // The stale flag went with it
        assert!(durable.get(TIER_FLAG_KEY, now).unwrap().is_none());
    }

    #[test]
    fn test_ephemeral_lost_on_restart() {
        let (store, _, durable) = make_store();
        let now = dashboard_util::now();
        store.save(&make_session(SessionTier::Ephemeral), now).unwrap();

        // New process: fresh memory tier, same durable tier
        let restarted = SessionStore::new(
            Arc::new(MemoryKv::new()),
            durable.clone(),
            chrono::Duration::days(7),
        );
        assert!(restarted.load(now).unwrap().is_none());
        assert!(durable.get(TIER_FLAG_KEY, now).unwrap().is_none());
    }

    #[test]
    fn test_missing_flag_falls_back_to_populated_slot() {
        let (store, _, durable) = make_store();
        let now = dashboard_util::now();
        let session = make_session(SessionTier::Durable);

        store.save(&session, now).unwrap();
        durable.remove(TIER_FLAG_KEY).unwrap();

        assert_eq!(store.load(now).unwrap(), Some(session));
    }

    #[test]
    fn test_clear_is_unconditional() {
        let (store, ephemeral, durable) = make_store();
        let now = dashboard_util::now();

        // Populate both slots directly, bypassing save
        let value = serde_json::to_string(&make_session(SessionTier::Ephemeral)).unwrap();
        ephemeral.put(SESSION_SLOT_KEY, &value, None).unwrap();
        durable.put(SESSION_SLOT_KEY, &value, None).unwrap();
        durable.put(TIER_FLAG_KEY, "ephemeral", None).unwrap();

        store.clear().unwrap();
        assert!(store.load(now).unwrap().is_none());
        assert!(ephemeral.get(SESSION_SLOT_KEY, now).unwrap().is_none());
        assert!(durable.get(SESSION_SLOT_KEY, now).unwrap().is_none());

        // Clearing nothing is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_slot_discarded() {
        let (store, ephemeral, _) = make_store();
        let now = dashboard_util::now();

        ephemeral.put(SESSION_SLOT_KEY, "not json", None).unwrap();
        assert!(store.load(now).unwrap().is_none());
        assert!(ephemeral.get(SESSION_SLOT_KEY, now).unwrap().is_none());
    }
}
