//! Best-effort TTL cache over a [`KeyValueStore`].
//!
//! Expiry is evaluated lazily on read: an expired entry reads as absent and is
//! deleted on the way out. Corrupted payloads and store failures read as absent
//! and are logged, never returned.

use ain_core::{CacheEntry, CacheInfo, CacheSlot, Clock, KeyValueStore, SystemClock};
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_TTL_MINUTES: i64 = 30;

#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("store", &"<dyn KeyValueStore>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Cache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    async fn read_entry(&self, key: &str) -> Option<CacheEntry<Value>> {
        let raw = match self.store.get_item(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "Failed to read from cache");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(key, error = %err, "Ignoring corrupted cache entry");
                None
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.read_entry(key).await?;
        let age = self.now_millis() - entry.timestamp;
        if age >= self.ttl.num_milliseconds() {
            debug!(key, age, "cache entry expired");
            if let Err(err) = self.store.remove_item(key).await {
                warn!(key, error = %err, "Failed to remove expired cache entry");
            }
            return None;
        }
        match serde_json::from_value(entry.data) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(key, error = %err, "Cached data has an unexpected shape");
                None
            }
        }
    }

    /// Overwrite `key` with `data` stamped at the current time.
    pub async fn set<T: Serialize>(&self, key: &str, data: &T) {
        let entry = CacheEntry {
            data,
            timestamp: self.now_millis(),
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "Failed to encode cache entry");
                return;
            }
        };
        if let Err(err) = self.store.set_item(key, &raw).await {
            warn!(key, error = %err, "Failed to write to cache");
        }
    }

    /// Remove one key, or both news slots when `key` is `None`.
    pub async fn clear(&self, key: Option<&str>) {
        let keys: Vec<&str> = match key {
            Some(key) => vec![key],
            None => CacheSlot::ALL.iter().map(CacheSlot::key).collect(),
        };
        for key in keys {
            if let Err(err) = self.store.remove_item(key).await {
                warn!(key, error = %err, "Failed to clear cache");
            }
        }
    }

    pub async fn info(&self, key: &str) -> Option<CacheInfo> {
        let entry = self.read_entry(key).await?;
        let ttl = self.ttl.num_milliseconds();
        let age = self.now_millis() - entry.timestamp;
        let is_expired = age >= ttl;
        Some(CacheInfo {
            age,
            is_expired,
            expires_in: if is_expired { 0 } else { ttl - age },
            item_count: entry.data.as_array().map_or(0, Vec::len),
        })
    }
}
