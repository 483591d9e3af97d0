//! Timestamped cache on top of a persistent key-value store.
//!
//! Each entry is stored as `{"data": ..., "timestamp": <epoch millis>}`. Whether an
//! entry is fresh is decided at read time against the TTL the caller passes, so one
//! cache serves datasets with different lifetimes.

use crate::clock::Clock;
use crate::error::StoreResult;
use crate::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A stored value together with its write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    /// Age of the entry at `now`, in milliseconds.
    pub fn age_millis(&self, now: i64) -> i64 {
        now - self.timestamp
    }

    /// Fresh iff younger than `ttl` at `now`.
    pub fn is_fresh(&self, now: i64, ttl: Duration) -> bool {
        self.age_millis(now) < ttl.as_millis() as i64
    }
}

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRead<T> {
    /// Entry exists and is younger than the TTL
    Fresh(T),
    /// Entry exists but has outlived the TTL
    Stale { data: T, age_millis: i64 },
    /// No usable entry
    Miss,
}

impl<T> CacheRead<T> {
    /// The cached value regardless of freshness.
    pub fn into_any(self) -> Option<T> {
        match self {
            CacheRead::Fresh(data) | CacheRead::Stale { data, .. } => Some(data),
            CacheRead::Miss => None,
        }
    }

    /// The cached value only if fresh.
    pub fn into_fresh(self) -> Option<T> {
        match self {
            CacheRead::Fresh(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, CacheRead::Fresh(_))
    }
}

/// Build a cache key from a dataset name and its parameters.
///
/// Parameters are sorted before joining so that `["eth", "btc"]` and
/// `["btc", "eth"]` share one entry.
pub fn cache_key<S: AsRef<str>>(dataset: &str, params: &[S]) -> String {
    if params.is_empty() {
        return dataset.to_string();
    }
    let mut parts: Vec<&str> = params.iter().map(|p| p.as_ref()).collect();
    parts.sort_unstable();
    format!("{}_{}", dataset, parts.join(","))
}

/// TTL cache backed by a [`KeyValueStore`].
///
/// Reads and writes never fail: a missing, unreadable or undecodable entry is a
/// miss, and a rejected write is logged and dropped. The store keeps whatever
/// entry it had before a rejected write.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Read `key`, classifying the entry against `ttl`.
    pub fn read<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> CacheRead<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheRead::Miss,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return CacheRead::Miss;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cached entry is malformed, treating as miss");
                return CacheRead::Miss;
            }
        };

        let now = self.clock.now_millis();
        if entry.is_fresh(now, ttl) {
            CacheRead::Fresh(entry.data)
        } else {
            CacheRead::Stale {
                age_millis: entry.age_millis(now),
                data: entry.data,
            }
        }
    }

    /// Store `value` under `key`, stamped with the current time.
    ///
    /// Returns whether the store accepted the write.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match self.encode(key, value) {
            Some(raw) => Self::accepted(key, self.store.set(key, &raw)),
            None => false,
        }
    }

    /// Like [`Self::write`], but the store write runs on the blocking pool.
    ///
    /// Encoding happens on the caller's task; only the store mutation (a full
    /// document rewrite for [`crate::store::FileStore`]) is moved off the runtime.
    pub async fn write_async<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let Some(raw) = self.encode(key, value) else {
            return false;
        };

        let store = self.store.clone();
        let owned_key = key.to_string();
        match tokio::task::spawn_blocking(move || store.set(&owned_key, &raw)).await {
            Ok(result) => Self::accepted(key, result),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache write task failed");
                false
            }
        }
    }

    fn encode<T: Serialize>(&self, key: &str, value: &T) -> Option<String> {
        let entry = CacheEntry {
            data: value,
            timestamp: self.clock.now_millis(),
        };

        match serde_json::to_string(&entry) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode cache entry");
                None
            }
        }
    }

    fn accepted(key: &str, result: StoreResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache write rejected, keeping previous entry");
                false
            }
        }
    }

    /// Drop the entry for `key`.
    pub fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key = %key, error = %e, "Failed to invalidate cache entry");
        }
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("now_millis", &self.clock.now_millis())
            .finish()
    }
}
