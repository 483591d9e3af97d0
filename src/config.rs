//! Configuration management for the market data layer.
//!
//! This module handles loading and validating configuration from environment variables.
//! Every setting has a default, so an empty environment yields a working configuration
//! pointed at the public CoinGecko API.

use crate::error::{ConfigError, ConfigResult};
use crate::store::DEFAULT_QUOTA_BYTES;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Public CoinGecko v3 endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// How long each dataset stays fresh in the TTL cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub trending: Duration,
    pub prices: Duration,
    pub top_coins: Duration,
    pub global: Duration,
    pub bitcoin: Duration,
    pub news: Duration,
    pub search: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            trending: Duration::from_secs(5 * 60),
            prices: Duration::from_secs(60),
            top_coins: Duration::from_secs(4 * 60 * 60),
            global: Duration::from_secs(4 * 60 * 60),
            bitcoin: Duration::from_secs(4 * 60 * 60),
            news: Duration::from_secs(60 * 60),
            search: Duration::from_secs(5 * 60),
        }
    }
}

/// Configuration for the dashboard runtime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Market-data API base URL
    pub api_base_url: String,

    /// HTTP request timeout in seconds (default: 10)
    pub request_timeout: u64,

    /// Location of the persistent store document
    pub store_path: PathBuf,

    /// Byte quota of the persistent store (default: 5 MiB)
    pub store_quota_bytes: usize,

    /// Refresh interval for price-like views in seconds (default: 60)
    pub price_poll_seconds: u64,

    /// Refresh interval for large lists in seconds (default: 300)
    pub list_poll_seconds: u64,

    /// Search quiet period in milliseconds (default: 300)
    pub search_debounce_ms: u64,

    /// Number of coins in the market table (default: 100)
    pub top_coins_limit: usize,

    /// Number of synthesized news articles (default: 20)
    pub news_article_count: usize,

    /// Per-dataset cache lifetimes
    pub cache_ttls: CacheTtls,

    /// Log level (default: "info")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `COINGECKO_API_BASE_URL`: API base URL
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 10)
    /// - `CRYPTODASH_STORE_PATH`: store document (default: `.cryptodash/store.json`)
    /// - `STORE_QUOTA_BYTES`: store quota (default: 5 MiB)
    /// - `PRICE_POLL_SECONDS` / `LIST_POLL_SECONDS`: refresh intervals (60 / 300)
    /// - `SEARCH_DEBOUNCE_MS`: search quiet period (default: 300)
    /// - `TOP_COINS_LIMIT`: market table size (default: 100, max 250)
    /// - `NEWS_ARTICLE_COUNT`: synthesized articles (default: 20, max 25)
    /// - `TOP_COINS_CACHE_MINUTES`, `NEWS_CACHE_MINUTES`, `MARKET_CACHE_MINUTES`:
    ///   cache lifetimes (240 / 60 / 240)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        let api_base_url =
            env::var("COINGECKO_API_BASE_URL").unwrap_or_else(|_| defaults.api_base_url.clone());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "COINGECKO_API_BASE_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        let store_path = env::var("CRYPTODASH_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| defaults.store_path.clone());

        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", defaults.request_timeout)?;
        let store_quota_bytes =
            Self::parse_env_usize("STORE_QUOTA_BYTES", defaults.store_quota_bytes)?;
        let price_poll_seconds =
            Self::parse_env_u64("PRICE_POLL_SECONDS", defaults.price_poll_seconds)?;
        let list_poll_seconds =
            Self::parse_env_u64("LIST_POLL_SECONDS", defaults.list_poll_seconds)?;
        let search_debounce_ms =
            Self::parse_env_u64("SEARCH_DEBOUNCE_MS", defaults.search_debounce_ms)?;
        let top_coins_limit = Self::parse_env_usize("TOP_COINS_LIMIT", defaults.top_coins_limit)?;
        let news_article_count =
            Self::parse_env_usize("NEWS_ARTICLE_COUNT", defaults.news_article_count)?;

        for (var, value) in [
            ("REQUEST_TIMEOUT", request_timeout),
            ("PRICE_POLL_SECONDS", price_poll_seconds),
            ("LIST_POLL_SECONDS", list_poll_seconds),
            ("SEARCH_DEBOUNCE_MS", search_debounce_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    var: var.to_string(),
                    reason: "Must be greater than zero".to_string(),
                });
            }
        }

        // The markets endpoint caps per_page at 250
        if top_coins_limit == 0 || top_coins_limit > 250 {
            return Err(ConfigError::InvalidValue {
                var: "TOP_COINS_LIMIT".to_string(),
                reason: "Must be between 1 and 250".to_string(),
            });
        }

        // News is synthesized from the top 25 coins
        if news_article_count > 25 {
            return Err(ConfigError::InvalidValue {
                var: "NEWS_ARTICLE_COUNT".to_string(),
                reason: "Must be at most 25".to_string(),
            });
        }

        let mut cache_ttls = defaults.cache_ttls;
        cache_ttls.top_coins = Self::parse_env_minutes("TOP_COINS_CACHE_MINUTES", cache_ttls.top_coins)?;
        cache_ttls.news = Self::parse_env_minutes("NEWS_CACHE_MINUTES", cache_ttls.news)?;
        let market = Self::parse_env_minutes("MARKET_CACHE_MINUTES", cache_ttls.global)?;
        cache_ttls.global = market;
        cache_ttls.bitcoin = market;

        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Config {
            api_base_url,
            request_timeout,
            store_path,
            store_quota_bytes,
            price_poll_seconds,
            list_poll_seconds,
            search_debounce_ms,
            top_coins_limit,
            news_article_count,
            cache_ttls,
            log_level,
        })
    }

    pub fn price_poll_interval(&self) -> Duration {
        Duration::from_secs(self.price_poll_seconds)
    }

    pub fn list_poll_interval(&self) -> Duration {
        Duration::from_secs(self.list_poll_seconds)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as usize with a default value.
    fn parse_env_usize(var_name: &str, default: usize) -> ConfigResult<usize> {
        match env::var(var_name) {
            Ok(val) => val.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse a whole number of minutes into a Duration.
    fn parse_env_minutes(var_name: &str, default: Duration) -> ConfigResult<Duration> {
        let minutes = Self::parse_env_u64(var_name, default.as_secs() / 60)?;
        Ok(Duration::from_secs(minutes * 60))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: 10,
            store_path: PathBuf::from(".cryptodash/store.json"),
            store_quota_bytes: DEFAULT_QUOTA_BYTES,
            price_poll_seconds: 60,
            list_poll_seconds: 300,
            search_debounce_ms: 300,
            top_coins_limit: 100,
            news_article_count: 20,
            cache_ttls: CacheTtls::default(),
            log_level: "info".to_string(),
        }
    }
}
