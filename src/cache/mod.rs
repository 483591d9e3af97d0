//! Caching utilities for the market data layer.
//!
//! This module provides a TTL cache persisted through a [`crate::store::KeyValueStore`].

pub mod ttl_cache;

pub use ttl_cache::{cache_key, CacheEntry, CacheRead, TtlCache};
