//! Watchlist of coin ids, persisted without expiry.

use crate::domain::CoinId;
use crate::models::Coin;
use crate::store::KeyValueStore;
use std::sync::Arc;

/// Store key holding the JSON array of watched ids.
pub const WATCHLIST_KEY: &str = "crypto-watchlist";

/// User watchlist backed by the persistent store.
///
/// Storage failures never surface: an unreadable list loads as empty and a
/// rejected save leaves the stored list as it was.
#[derive(Clone)]
pub struct Watchlist {
    store: Arc<dyn KeyValueStore>,
}

impl Watchlist {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Watched ids in insertion order.
    pub fn load(&self) -> Vec<CoinId> {
        let raw = match self.store.get(WATCHLIST_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read watchlist");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => {
                let mut watched: Vec<CoinId> = Vec::with_capacity(ids.len());
                for id in ids.into_iter().filter_map(|id| CoinId::new(id).ok()) {
                    if !watched.contains(&id) {
                        watched.push(id);
                    }
                }
                watched
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored watchlist is malformed, ignoring it");
                Vec::new()
            }
        }
    }

    pub fn contains(&self, id: &CoinId) -> bool {
        self.load().contains(id)
    }

    /// Add `id` if absent, remove it if present.
    ///
    /// Returns whether `id` is watched afterwards, as persisted.
    pub fn toggle(&self, id: &CoinId) -> bool {
        let mut ids = self.load();
        let was_watched = match ids.iter().position(|w| w == id) {
            Some(pos) => {
                ids.remove(pos);
                true
            }
            None => {
                ids.push(id.clone());
                false
            }
        };

        if self.save(&ids) {
            !was_watched
        } else {
            was_watched
        }
    }

    /// Keep only watched coins from `coins`, preserving order.
    pub fn retain_watched(&self, coins: Vec<Coin>) -> Vec<Coin> {
        let watched = self.load();
        coins
            .into_iter()
            .filter(|coin| watched.iter().any(|id| id.as_str() == coin.id))
            .collect()
    }

    fn save(&self, ids: &[CoinId]) -> bool {
        let raw = match serde_json::to_string(ids) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode watchlist");
                return false;
            }
        };
        match self.store.set(WATCHLIST_KEY, &raw) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save watchlist");
                false
            }
        }
    }
}
