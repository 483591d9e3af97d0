//! Async wrapper around the synchronous CoinGeckoClient.
//!
//! This module provides an async interface to the synchronous client by using
//! `tokio::task::spawn_blocking` to run HTTP operations on a dedicated thread pool,
//! preventing blocking of the async runtime.

use crate::client::responses::CoinDetail;
use crate::client::CoinGeckoClient;
use crate::error::{MarketApiError, MarketApiResult};
use crate::news::gather_articles;
use crate::models::{
    BitcoinOverview, Coin, GlobalMarketStats, NewsArticle, PriceMap, SearchHit, Timeframe,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Async market-data operations.
///
/// The market service depends on this trait rather than the concrete client so
/// tests can substitute scripted implementations.
#[async_trait]
pub trait AsyncMarketClient: Send + Sync {
    async fn trending_coins(&self) -> MarketApiResult<Vec<Coin>>;
    async fn top_coins(&self, limit: usize) -> MarketApiResult<Vec<Coin>>;
    async fn simple_prices(&self, ids: &[String]) -> MarketApiResult<PriceMap>;
    async fn search(&self, query: &str) -> MarketApiResult<Vec<SearchHit>>;

    async fn global_stats(&self) -> MarketApiResult<GlobalMarketStats>;
    async fn bitcoin_overview(&self, timeframe: Timeframe) -> MarketApiResult<BitcoinOverview>;

    async fn coin_detail(&self, id: &str) -> MarketApiResult<CoinDetail>;
    async fn news_articles(&self, count: usize) -> MarketApiResult<Vec<NewsArticle>>;
}

fn join_error(e: tokio::task::JoinError) -> MarketApiError {
    MarketApiError::Network(format!("Task join error: {}", e))
}

/// Runs each [`CoinGeckoClient`] call on the blocking pool.
#[derive(Clone)]
pub struct AsyncMarketClientImpl {
    client: Arc<CoinGeckoClient>,
}

impl AsyncMarketClientImpl {
    pub fn new(client: CoinGeckoClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl AsyncMarketClient for AsyncMarketClientImpl {
    async fn trending_coins(&self) -> MarketApiResult<Vec<Coin>> {
        let client = self.client.clone();

        tokio::task::spawn_blocking(move || client.trending_coins())
            .await
            .map_err(join_error)?
    }

    async fn top_coins(&self, limit: usize) -> MarketApiResult<Vec<Coin>> {
        let client = self.client.clone();

        tokio::task::spawn_blocking(move || client.top_coins(limit))
            .await
            .map_err(join_error)?
    }

    async fn simple_prices(&self, ids: &[String]) -> MarketApiResult<PriceMap> {
        if ids.is_empty() {
            return Ok(PriceMap::new());
        }
        let client = self.client.clone();
        let ids = ids.to_vec();

        tokio::task::spawn_blocking(move || client.simple_prices(&ids))
            .await
            .map_err(join_error)?
    }

    async fn search(&self, query: &str) -> MarketApiResult<Vec<SearchHit>> {
        let client = self.client.clone();
        let query = query.to_string();

        tokio::task::spawn_blocking(move || client.search(&query))
            .await
            .map_err(join_error)?
    }

    async fn global_stats(&self) -> MarketApiResult<GlobalMarketStats> {
        let client = self.client.clone();

        tokio::task::spawn_blocking(move || client.global_stats())
            .await
            .map_err(join_error)?
    }

    async fn bitcoin_overview(&self, timeframe: Timeframe) -> MarketApiResult<BitcoinOverview> {
        let client = self.client.clone();

        tokio::task::spawn_blocking(move || client.bitcoin_overview(timeframe))
            .await
            .map_err(join_error)?
    }

    async fn coin_detail(&self, id: &str) -> MarketApiResult<CoinDetail> {
        let client = self.client.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || client.coin_detail(&id))
            .await
            .map_err(join_error)?
    }

    async fn news_articles(&self, count: usize) -> MarketApiResult<Vec<NewsArticle>> {
        let headlines = self.client.headlines();
        gather_articles(self, headlines.as_ref(), count).await
    }
}
