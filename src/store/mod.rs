//! Persistent key-value storage.
//!
//! This module provides the durable string-keyed store that backs the TTL cache,
//! the watchlist and the portfolio. Values are opaque strings (JSON in practice).
//! Every implementation enforces a byte quota the way browser local storage does.

pub mod file_store;
pub mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::error::{StoreError, StoreResult};
use std::collections::HashMap;

/// Default byte quota, matching the usual local storage allowance.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Durable string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// A rejected write leaves the previous value untouched.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// All keys currently stored.
    fn keys(&self) -> StoreResult<Vec<String>>;
}

/// Bytes a store would hold after writing `value` under `key`.
fn projected_usage(entries: &HashMap<String, String>, key: &str, value: &str) -> usize {
    let current: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
    let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
    current - replaced + key.len() + value.len()
}

/// Reject a write that would exceed `limit` bytes.
pub(crate) fn check_quota(
    entries: &HashMap<String, String>,
    key: &str,
    value: &str,
    limit: usize,
) -> StoreResult<()> {
    let needed = projected_usage(entries, key, value);
    if needed > limit {
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            needed,
            limit,
        });
    }
    Ok(())
}
