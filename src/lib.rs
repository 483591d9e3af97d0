//! CryptoDash - data layer of a cryptocurrency market dashboard.
//!
//! This library fetches market data from the CoinGecko public API and keeps it fresh
//! with a TTL cache on top of a persistent local key-value store, serving the last
//! known value when the upstream is unavailable.
//!
//! # Architecture
//!
//! - **store**: Persistent key-value storage with a byte quota
//! - **cache**: Timestamped entries with fresh/stale reads
//! - **client**: HTTP client for the CoinGecko API and its async wrapper
//! - **services**: Cache-or-fetch orchestration per dataset
//! - **poller**: Interval refresh of a dataset
//! - **search**: Debounced coin search
//! - **models**: Coins, quotes, market stats, news, watchlist and portfolio
//! - **error**: Custom error types for precise error handling
//! - **config**: Configuration management from environment variables

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod format;
pub mod metrics;
pub mod models;
pub mod news;
pub mod poller;
pub mod search;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use cache::{cache_key, CacheEntry, CacheRead, TtlCache};
pub use client::{AsyncMarketClient, AsyncMarketClientImpl, CoinGeckoClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheTtls, Config};
pub use error::{ConfigError, MarketApiError, StoreError};
pub use metrics::{HttpTimer, Metrics, MetricsSummary};
pub use models::{
    BitcoinOverview, Coin, GlobalMarketStats, NewsArticle, Portfolio, PriceMap, PriceQuote,
    SearchHit, Timeframe, Watchlist,
};
pub use poller::{PollState, Poller, PollerHandle};
pub use search::{DebounceState, SearchDebouncer, SearchSnapshot};
pub use services::{load_home, DataSource, Fetched, MarketService, MarketServiceImpl};
pub use store::{FileStore, KeyValueStore, MemoryStore};
