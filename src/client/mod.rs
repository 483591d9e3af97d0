//! HTTP client for the CoinGecko v3 market-data API.
//!
//! This module provides a synchronous HTTP client that can be used from async contexts
//! via `tokio::task::spawn_blocking`. The client maps provider payloads into the
//! dashboard models and never caches; freshness is the market service's concern.

mod async_wrapper;
pub mod responses;
pub use async_wrapper::{AsyncMarketClient, AsyncMarketClientImpl};

use crate::config::{Config, DEFAULT_API_BASE_URL};
use crate::error::{MarketApiError, MarketApiResult};
use crate::metrics::{HttpTimer, Metrics};
use crate::models::{
    BitcoinOverview, Coin, DominanceMetric, GlobalMarketStats, MarketMetric, PriceMap,
    SearchHit, Sentiment, Timeframe,
};
use crate::news::{HeadlineGenerator, RandomHeadlines};
use responses::{
    chart_points, into_price_map, CoinDetail, GlobalResponse, MarketChartResponse,
    MarketEntry, RawQuote, SearchResponse, TrendingResponse,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of search hits returned per query.
pub const SEARCH_RESULT_LIMIT: usize = 10;

/// Coins considered when synthesizing news.
pub const NEWS_SOURCE_COINS: usize = 25;

/// Points kept in the global-stats mini charts.
const GLOBAL_SERIES_POINTS: usize = 12;

/// Points kept in the bitcoin overview chart.
const BITCOIN_SERIES_POINTS: usize = 24;

/// HTTP client for the CoinGecko API.
///
/// This client uses `ureq` for synchronous HTTP requests and can be called
/// from async contexts using `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct CoinGeckoClient {
    /// Base URL for the API
    base_url: String,

    /// HTTP client agent
    agent: Arc<ureq::Agent>,

    /// Metrics collector
    metrics: Metrics,

    /// Picks headline variants for synthesized news
    headlines: Arc<dyn HeadlineGenerator>,
}

impl CoinGeckoClient {
    /// Create a new client from configuration.
    pub fn new(config: &Config) -> Self {
        Self::build(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout),
        )
    }

    /// Create a client with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String) -> Self {
        Self::build(base_url, Duration::from_secs(10))
    }

    fn build(base_url: String, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        Self {
            base_url,
            agent: Arc::new(agent),
            metrics: Metrics::new(),
            headlines: Arc::new(RandomHeadlines::from_entropy()),
        }
    }

    /// Replace the headline generator (seeded or fixed generators make news deterministic).
    pub fn with_headlines(mut self, headlines: Arc<dyn HeadlineGenerator>) -> Self {
        self.headlines = headlines;
        self
    }

    /// Generator used when synthesizing news from this client's data.
    pub fn headlines(&self) -> Arc<dyn HeadlineGenerator> {
        self.headlines.clone()
    }

    /// Share an existing metrics collector.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Get a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Execute a GET request and decode the JSON body.
    fn get<T: DeserializeOwned>(&self, path: &str) -> MarketApiResult<T> {
        let timer = HttpTimer::new(self.metrics.clone());
        let url = self.build_url(path);

        tracing::debug!("GET {}", url);

        let body = self
            .agent
            .get(&url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| self.map_error(e))
            .and_then(|response| {
                response
                    .into_string()
                    .map_err(|e| MarketApiError::Network(e.to_string()))
            });

        let body = match body {
            Ok(body) => {
                timer.complete();
                body
            }
            Err(e) => {
                tracing::debug!("GET {} - Error: {}", url, e);
                timer.complete_with_error();
                return Err(e);
            }
        };

        serde_json::from_str(&body).map_err(MarketApiError::Deserialization)
    }

    /// Map a ureq error to a MarketApiError.
    fn map_error(&self, error: ureq::Error) -> MarketApiError {
        match error {
            ureq::Error::Status(status, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                MarketApiError::Upstream { status, message }
            }
            ureq::Error::Transport(transport) => {
                let message = transport.to_string();
                if message.contains("timed out") {
                    MarketApiError::Timeout
                } else {
                    MarketApiError::Network(message)
                }
            }
        }
    }

    // ========================= Coin lists =========================

    /// Coins currently trending on the provider, without prices.
    pub fn trending_coins(&self) -> MarketApiResult<Vec<Coin>> {
        let response: TrendingResponse = self.get("/search/trending")?;
        Ok(response.coins.into_iter().map(|c| c.item.into()).collect())
    }

    /// The `limit` largest coins by market cap, ranked 1..=limit.
    pub fn top_coins(&self, limit: usize) -> MarketApiResult<Vec<Coin>> {
        if limit == 0 {
            return Err(MarketApiError::InvalidRequest(
                "limit must be greater than zero".to_string(),
            ));
        }
        let path = format!(
            "/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1&sparkline=false&price_change_percentage=24h",
            limit
        );
        let entries: Vec<MarketEntry> = self.get(&path)?;
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| entry.into_coin(i))
            .collect())
    }

    /// USD quotes with 24h change for `ids`. Ids the provider does not know are absent.
    pub fn simple_prices(&self, ids: &[String]) -> MarketApiResult<PriceMap> {
        if ids.is_empty() {
            return Ok(PriceMap::new());
        }
        let path = format!(
            "/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            urlencoding::encode(&ids.join(","))
        );
        let raw: HashMap<String, RawQuote> = self.get(&path)?;
        Ok(into_price_map(raw))
    }

    /// Free-text coin search, at most [`SEARCH_RESULT_LIMIT`] hits.
    pub fn search(&self, query: &str) -> MarketApiResult<Vec<SearchHit>> {
        let path = format!("/search?query={}", urlencoding::encode(query));
        let response: SearchResponse = self.get(&path)?;
        Ok(response
            .coins
            .into_iter()
            .take(SEARCH_RESULT_LIMIT)
            .map(SearchHit::from)
            .collect())
    }

    // ========================= Market overview =========================

    /// Market-wide totals, 24h mini charts and the bitcoin-driven sentiment.
    pub fn global_stats(&self) -> MarketApiResult<GlobalMarketStats> {
        let global: GlobalResponse = self.get("/global")?;
        let chart = self.market_chart("bitcoin", Timeframe::Day)?;
        let bitcoin = self.simple_prices(&["bitcoin".to_string()])?;
        let bitcoin_change = bitcoin
            .get("bitcoin")
            .and_then(|q| q.usd_24h_change)
            .unwrap_or(0.0);

        let data = global.data;
        let change = data.market_cap_change_percentage_24h_usd.unwrap_or(0.0);
        let usd = |map: &HashMap<String, f64>, key: &str| map.get(key).copied().unwrap_or(0.0);

        Ok(GlobalMarketStats {
            market_cap: MarketMetric {
                value: usd(&data.total_market_cap, "usd"),
                change,
                series: chart_points(&chart.market_caps, Timeframe::Day, GLOBAL_SERIES_POINTS),
            },
            // The provider has no volume change; market cap change stands in.
            volume: MarketMetric {
                value: usd(&data.total_volume, "usd"),
                change,
                series: chart_points(&chart.total_volumes, Timeframe::Day, GLOBAL_SERIES_POINTS),
            },
            btc_dominance: DominanceMetric {
                value: usd(&data.market_cap_percentage, "btc"),
                change: 0.0,
            },
            sentiment: Sentiment::from_price_change(bitcoin_change),
        })
    }

    /// Bitcoin price and a chart over `timeframe`.
    pub fn bitcoin_overview(&self, timeframe: Timeframe) -> MarketApiResult<BitcoinOverview> {
        let detail = self.coin_detail_with_market_data("bitcoin")?;
        let chart = self.market_chart("bitcoin", timeframe)?;

        let market_data = detail.market_data.ok_or_else(|| {
            MarketApiError::Deserialization(serde::de::Error::missing_field("market_data"))
        })?;

        Ok(BitcoinOverview {
            price: market_data.current_price.get("usd").copied().unwrap_or(0.0),
            price_change_24h: market_data.price_change_percentage_24h.unwrap_or(0.0),
            series: chart_points(&chart.prices, timeframe, BITCOIN_SERIES_POINTS),
        })
    }

    fn market_chart(&self, id: &str, timeframe: Timeframe) -> MarketApiResult<MarketChartResponse> {
        let path = format!(
            "/coins/{}/market_chart?vs_currency=usd&days={}",
            urlencoding::encode(id),
            timeframe.days_param()
        );
        self.get(&path)
    }

    fn coin_detail_with_market_data(&self, id: &str) -> MarketApiResult<CoinDetail> {
        let path = format!(
            "/coins/{}?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=false",
            urlencoding::encode(id)
        );
        self.get(&path)
    }

    // ============================= Coin detail ==============================

    /// Metadata for one coin (description only, no market data).
    pub fn coin_detail(&self, id: &str) -> MarketApiResult<CoinDetail> {
        let path = format!(
            "/coins/{}?localization=false&tickers=false&market_data=false&community_data=false&developer_data=false&sparkline=false",
            urlencoding::encode(id)
        );
        self.get(&path)
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_API_BASE_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_joins_slashes() {
        let client = CoinGeckoClient::with_base_url("http://localhost:1/api/v3/".to_string());
        assert_eq!(
            client.build_url("/search/trending"),
            "http://localhost:1/api/v3/search/trending"
        );
    }

    #[test]
    fn test_empty_price_request_skips_network() {
        // Port 9 is discard; any real request would fail
        let client = CoinGeckoClient::with_base_url("http://127.0.0.1:9".to_string());
        assert!(client.simple_prices(&[]).unwrap().is_empty());
        assert_eq!(client.metrics().http_requests_total(), 0);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let client = CoinGeckoClient::default();
        assert!(matches!(
            client.top_coins(0),
            Err(MarketApiError::InvalidRequest(_))
        ));
    }
}
