//! Market data service.
//!
//! Combines the upstream client with the TTL cache: one cache-or-fetch decision per
//! key, write-back on success and the last cached value served when the upstream
//! fails.

use crate::cache::{cache_key, CacheRead, TtlCache};
use crate::client::AsyncMarketClient;
use crate::config::CacheTtls;
use crate::error::MarketApiResult;
use crate::metrics::Metrics;
use crate::models::{
    merge_quotes, BitcoinOverview, Coin, GlobalMarketStats, NewsArticle, PriceMap, SearchHit,
    Timeframe,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const TRENDING_KEY: &str = "trendingCoins";
pub const MARKET_DATA_KEY: &str = "marketData";
pub const NEWS_KEY: &str = "cryptoNews";

/// Default number of synthesized news articles.
pub const DEFAULT_NEWS_COUNT: usize = 20;

/// Where a returned value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Fresh cache entry, no network call
    Cache,
    /// Fetched from the upstream just now
    Network,
    /// Upstream failed; last cached value of any age
    Stale,
    /// Nothing to fetch (empty query or id list)
    Skipped,
}

impl DataSource {
    /// The less trustworthy of two sources, for composite results.
    pub fn combine(self, other: DataSource) -> DataSource {
        use DataSource::*;
        match (self, other) {
            (Stale, _) | (_, Stale) => Stale,
            (Network, _) | (_, Network) => Network,
            (Cache, _) | (_, Cache) => Cache,
            (Skipped, Skipped) => Skipped,
        }
    }
}

/// A value together with its [`DataSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Fetched<T> {
    pub fn new(data: T, source: DataSource) -> Self {
        Self { data, source }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            source: self.source,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.source == DataSource::Stale
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// Return a fresh cache entry without touching the network
    PreferCache,
    /// Always ask the upstream; the cache is only a fallback
    Refresh,
}

/// Market data operations used by the dashboard surfaces.
#[async_trait]
pub trait MarketService: Send + Sync {
    /// Trending coins with current prices merged in.
    async fn trending_coins(&self) -> MarketApiResult<Fetched<Vec<Coin>>>;

    /// Trending coins, ignoring fresh cache entries.
    async fn refresh_trending_coins(&self) -> MarketApiResult<Fetched<Vec<Coin>>>;

    /// The `limit` largest coins by market cap.
    async fn top_coins(&self, limit: usize) -> MarketApiResult<Fetched<Vec<Coin>>>;

    /// Top coins, ignoring fresh cache entries.
    async fn refresh_top_coins(&self, limit: usize) -> MarketApiResult<Fetched<Vec<Coin>>>;

    /// USD quotes for `ids`.
    async fn coin_prices(&self, ids: &[String]) -> MarketApiResult<Fetched<PriceMap>>;

    async fn global_stats(&self) -> MarketApiResult<Fetched<GlobalMarketStats>>;

    async fn bitcoin_overview(&self, timeframe: Timeframe)
        -> MarketApiResult<Fetched<BitcoinOverview>>;

    async fn news(&self) -> MarketApiResult<Fetched<Vec<NewsArticle>>>;

    /// News, ignoring fresh cache entries.
    async fn refresh_news(&self) -> MarketApiResult<Fetched<Vec<NewsArticle>>>;

    /// Free-text coin search. Blank queries are [`DataSource::Skipped`].
    async fn search(&self, query: &str) -> MarketApiResult<Fetched<Vec<SearchHit>>>;
}

/// Default implementation of MarketService.
pub struct MarketServiceImpl {
    client: Arc<dyn AsyncMarketClient>,
    cache: TtlCache,
    ttls: CacheTtls,
    metrics: Metrics,
    news_count: usize,
}

impl MarketServiceImpl {
    /// Create a new market service.
    pub fn new(
        client: Arc<dyn AsyncMarketClient>,
        cache: TtlCache,
        ttls: CacheTtls,
        metrics: Metrics,
    ) -> Self {
        Self {
            client,
            cache,
            ttls,
            metrics,
            news_count: DEFAULT_NEWS_COUNT,
        }
    }

    /// Set how many news articles to synthesize.
    pub fn with_news_count(mut self, news_count: usize) -> Self {
        self.news_count = news_count;
        self
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Single cache-or-fetch decision for `key`.
    async fn cache_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        mode: FetchMode,
        fetch: F,
    ) -> MarketApiResult<Fetched<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = MarketApiResult<T>> + Send,
    {
        let fallback = match (mode, self.cache.read::<T>(key, ttl)) {
            (FetchMode::PreferCache, CacheRead::Fresh(data)) => {
                tracing::debug!(key = %key, "Cache hit");
                self.metrics.record_cache_hit();
                return Ok(Fetched::new(data, DataSource::Cache));
            }
            (_, read) => read.into_any(),
        };

        self.metrics.record_cache_miss();
        tracing::debug!(key = %key, ?mode, "Fetching from upstream");

        match fetch().await {
            Ok(data) => {
                if !self.cache.write_async(key, &data).await {
                    self.metrics.record_store_write_failure();
                }
                Ok(Fetched::new(data, DataSource::Network))
            }
            Err(e) => match fallback {
                Some(data) => {
                    tracing::warn!(key = %key, error = %e, "Upstream failed, serving cached value");
                    self.metrics.record_stale_served();
                    Ok(Fetched::new(data, DataSource::Stale))
                }
                None => {
                    tracing::warn!(key = %key, error = %e, "Upstream failed with nothing cached");
                    Err(e)
                }
            },
        }
    }

    async fn prices(&self, ids: &[String], mode: FetchMode) -> MarketApiResult<Fetched<PriceMap>> {
        if ids.is_empty() {
            return Ok(Fetched::new(PriceMap::new(), DataSource::Skipped));
        }
        let key = cache_key("coinPrices", ids);
        self.cache_or_fetch(&key, self.ttls.prices, mode, || {
            self.client.simple_prices(ids)
        })
        .await
    }

    async fn trending(&self, mode: FetchMode) -> MarketApiResult<Fetched<Vec<Coin>>> {
        let listed = self
            .cache_or_fetch(TRENDING_KEY, self.ttls.trending, mode, || {
                self.client.trending_coins()
            })
            .await?;

        let ids: Vec<String> = listed.data.iter().map(|c| c.id.clone()).collect();
        match self.prices(&ids, mode).await {
            Ok(prices) => Ok(Fetched::new(
                merge_quotes(listed.data, &prices.data),
                listed.source.combine(prices.source),
            )),
            Err(e) => {
                tracing::warn!(error = %e, "Trending prices unavailable, returning unpriced coins");
                Ok(listed)
            }
        }
    }

    async fn top(&self, limit: usize, mode: FetchMode) -> MarketApiResult<Fetched<Vec<Coin>>> {
        let key = cache_key("topCoins", &[limit.to_string()]);
        self.cache_or_fetch(&key, self.ttls.top_coins, mode, || {
            self.client.top_coins(limit)
        })
        .await
    }

    async fn news_with(&self, mode: FetchMode) -> MarketApiResult<Fetched<Vec<NewsArticle>>> {
        let count = self.news_count;
        self.cache_or_fetch(NEWS_KEY, self.ttls.news, mode, || {
            self.client.news_articles(count)
        })
        .await
    }
}

#[async_trait]
impl MarketService for MarketServiceImpl {
    async fn trending_coins(&self) -> MarketApiResult<Fetched<Vec<Coin>>> {
        self.trending(FetchMode::PreferCache).await
    }

    async fn refresh_trending_coins(&self) -> MarketApiResult<Fetched<Vec<Coin>>> {
        self.trending(FetchMode::Refresh).await
    }

    async fn top_coins(&self, limit: usize) -> MarketApiResult<Fetched<Vec<Coin>>> {
        self.top(limit, FetchMode::PreferCache).await
    }

    async fn refresh_top_coins(&self, limit: usize) -> MarketApiResult<Fetched<Vec<Coin>>> {
        self.top(limit, FetchMode::Refresh).await
    }

    async fn coin_prices(&self, ids: &[String]) -> MarketApiResult<Fetched<PriceMap>> {
        self.prices(ids, FetchMode::PreferCache).await
    }

    async fn global_stats(&self) -> MarketApiResult<Fetched<GlobalMarketStats>> {
        self.cache_or_fetch(
            MARKET_DATA_KEY,
            self.ttls.global,
            FetchMode::PreferCache,
            || self.client.global_stats(),
        )
        .await
    }

    async fn bitcoin_overview(
        &self,
        timeframe: Timeframe,
    ) -> MarketApiResult<Fetched<BitcoinOverview>> {
        let key = cache_key("bitcoinData", &[timeframe.as_str()]);
        self.cache_or_fetch(&key, self.ttls.bitcoin, FetchMode::PreferCache, || {
            self.client.bitcoin_overview(timeframe)
        })
        .await
    }

    async fn news(&self) -> MarketApiResult<Fetched<Vec<NewsArticle>>> {
        self.news_with(FetchMode::PreferCache).await
    }

    async fn refresh_news(&self) -> MarketApiResult<Fetched<Vec<NewsArticle>>> {
        self.news_with(FetchMode::Refresh).await
    }

    async fn search(&self, query: &str) -> MarketApiResult<Fetched<Vec<SearchHit>>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Fetched::new(Vec::new(), DataSource::Skipped));
        }
        let key = cache_key("search", &[query.to_lowercase()]);
        self.cache_or_fetch(&key, self.ttls.search, FetchMode::PreferCache, || {
            self.client.search(query)
        })
        .await
    }
}
