use core::time::Duration;
use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use super::{TokenCache, ttl_secs};
use crate::{CacheError, Clock, SystemClock};

struct Entry {
    value: String,
    expires_at: i64,
}

/// In-process [`TokenCache`]. Expired entries are dropped lazily on access or
/// in bulk by [`MemoryCache::purge_expired`].
///
/// State is not shared between processes, so revocations made on one node
/// are invisible to the others. Clones share state.
pub struct MemoryCache<K = SystemClock> {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    clock: K,
}

impl Default for MemoryCache<SystemClock> {
    fn default() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K: Clone> Clone for MemoryCache<K> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            clock: self.clock.clone(),
        }
    }
}

impl<K: Clock> MemoryCache<K> {
    pub fn with_clock(clock: K) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.unix_seconds();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = self.clock.unix_seconds();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

impl<K: Clock> TokenCache for MemoryCache<K> {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let ttl = i64::try_from(ttl_secs(ttl)).unwrap_or(i64::MAX);
        let expires_at = self.clock.unix_seconds().saturating_add(ttl);
        self.entries.lock().insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.live_value(key))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.live_value(key).is_some())
    }
}
