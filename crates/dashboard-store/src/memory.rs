//! In-memory key-value slots, gone when the process exits

use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{KeyValueStore, StoreError, StoreResult};

type Slot = (String, Option<DateTime<Local>>);

/// Process-lifetime slot storage backing the ephemeral session tier
#[derive(Debug, Default)]
pub struct MemoryKv {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Slot>>> {
        self.slots
            .lock()
            .map_err(|_| StoreError::Database("memory slots lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str, now: DateTime<Local>) -> StoreResult<Option<String>> {
        let mut slots = self.slots()?;

        let expired = match slots.get(key) {
            None => return Ok(None),
            Some((_, Some(expires_at))) => *expires_at <= now,
            Some((_, None)) => false,
        };

        if expired {
            slots.remove(key);
            return Ok(None);
        }

        Ok(slots.get(key).map(|(value, _)| value.clone()))
    }

    fn put(&self, key: &str, value: &str, expires_at: Option<DateTime<Local>>) -> StoreResult<()> {
        self.slots()?
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.slots()?.remove(key);
        Ok(())
    }
}
