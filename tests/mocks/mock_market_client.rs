use async_trait::async_trait;
use cryptodash::client::responses::{CoinDescription, CoinDetail};
use cryptodash::client::AsyncMarketClient;
use cryptodash::error::{MarketApiError, MarketApiResult};
use cryptodash::models::{
    BitcoinOverview, Coin, DominanceMetric, GlobalMarketStats, MarketMetric, NewsArticle,
    PriceMap, PriceQuote, SearchHit, Sentiment, Timeframe,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
enum Failure {
    Status(u16),
    Malformed,
}

/// Scripted market client for testing.
///
/// Serves canned data, can be told to fail individual operations with an
/// upstream status or an undecodable body, and records every call in order
/// for verification.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockMarketClient {
    trending: Arc<Mutex<Vec<Coin>>>,
    top: Arc<Mutex<Vec<Coin>>>,
    prices: Arc<Mutex<PriceMap>>,
    news: Arc<Mutex<Vec<NewsArticle>>>,
    failing: Arc<Mutex<HashMap<String, Failure>>>,
    search_delay: Arc<Mutex<Duration>>,
    detail_delay: Arc<Mutex<Duration>>,
    details_in_flight: Arc<AtomicUsize>,
    max_details_in_flight: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<String>>>,
    search_queries: Arc<Mutex<Vec<String>>>,
    price_requests: Arc<Mutex<Vec<Vec<String>>>>,
}

#[allow(dead_code)]
pub fn coin(id: &str, name: &str, symbol: &str) -> Coin {
    Coin {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        ..Default::default()
    }
}

#[allow(dead_code)]
impl MockMarketClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_trending(&self, coins: Vec<Coin>) {
        *self.trending.lock().unwrap() = coins;
    }

    pub fn set_top_coins(&self, coins: Vec<Coin>) {
        *self.top.lock().unwrap() = coins;
    }

    pub fn set_price(&self, id: &str, usd: f64, change: Option<f64>) {
        self.prices.lock().unwrap().insert(
            id.to_string(),
            PriceQuote {
                usd,
                usd_24h_change: change,
            },
        );
    }

    pub fn set_news(&self, articles: Vec<NewsArticle>) {
        *self.news.lock().unwrap() = articles;
    }

    /// Make `method` fail with an upstream `status` until [`Self::recover`] is called.
    pub fn fail(&self, method: &str, status: u16) {
        self.failing
            .lock()
            .unwrap()
            .insert(method.to_string(), Failure::Status(status));
    }

    /// Make `method` fail as if the upstream body could not be decoded.
    pub fn fail_malformed(&self, method: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(method.to_string(), Failure::Malformed);
    }

    pub fn recover(&self, method: &str) {
        self.failing.lock().unwrap().remove(method);
    }

    pub fn set_search_delay(&self, delay: Duration) {
        *self.search_delay.lock().unwrap() = delay;
    }

    pub fn set_detail_delay(&self, delay: Duration) {
        *self.detail_delay.lock().unwrap() = delay;
    }

    /// Highest number of coin detail requests seen running at once.
    pub fn max_details_in_flight(&self) -> usize {
        self.max_details_in_flight.load(Ordering::SeqCst)
    }

    /// Number of times `method` was called.
    pub fn get_call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == method)
            .count()
    }

    /// Method names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }

    pub fn price_requests(&self) -> Vec<Vec<String>> {
        self.price_requests.lock().unwrap().clone()
    }

    pub fn reset_call_counts(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn track_call(&self, method: &str) -> MarketApiResult<()> {
        self.calls.lock().unwrap().push(method.to_string());
        match self.failing.lock().unwrap().get(method) {
            Some(Failure::Status(status)) => Err(MarketApiError::Upstream {
                status: *status,
                message: format!("{} failed", method),
            }),
            Some(Failure::Malformed) => Err(MarketApiError::Deserialization(
                serde_json::from_str::<serde_json::Value>("{\"truncated\":").unwrap_err(),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AsyncMarketClient for MockMarketClient {
    async fn trending_coins(&self) -> MarketApiResult<Vec<Coin>> {
        self.track_call("trending_coins")?;
        Ok(self.trending.lock().unwrap().clone())
    }

    async fn top_coins(&self, limit: usize) -> MarketApiResult<Vec<Coin>> {
        self.track_call("top_coins")?;
        Ok(self
            .top
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn simple_prices(&self, ids: &[String]) -> MarketApiResult<PriceMap> {
        self.price_requests.lock().unwrap().push(ids.to_vec());
        self.track_call("simple_prices")?;
        let prices = self.prices.lock().unwrap();
        Ok(prices
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(id, quote)| (id.clone(), *quote))
            .collect())
    }

    async fn search(&self, query: &str) -> MarketApiResult<Vec<SearchHit>> {
        self.search_queries.lock().unwrap().push(query.to_string());
        let delay = *self.search_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.track_call("search")?;
        Ok(vec![SearchHit {
            id: query.to_lowercase(),
            name: query.to_string(),
            symbol: query.to_uppercase(),
            image: String::new(),
            market_cap_rank: None,
        }])
    }

    async fn global_stats(&self) -> MarketApiResult<GlobalMarketStats> {
        self.track_call("global_stats")?;
        Ok(GlobalMarketStats {
            market_cap: MarketMetric {
                value: 2.45e12,
                change: 1.5,
                series: Vec::new(),
            },
            volume: MarketMetric {
                value: 9.8e10,
                change: 1.5,
                series: Vec::new(),
            },
            btc_dominance: DominanceMetric {
                value: 52.1,
                change: 0.0,
            },
            sentiment: Sentiment::Neutral,
        })
    }

    async fn bitcoin_overview(&self, _timeframe: Timeframe) -> MarketApiResult<BitcoinOverview> {
        self.track_call("bitcoin_overview")?;
        Ok(BitcoinOverview {
            price: 65_000.0,
            price_change_24h: 2.0,
            series: Vec::new(),
        })
    }

    async fn coin_detail(&self, id: &str) -> MarketApiResult<CoinDetail> {
        self.track_call("coin_detail")?;
        let running = self.details_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_details_in_flight.fetch_max(running, Ordering::SeqCst);
        let delay = *self.detail_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.details_in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(CoinDetail {
            id: id.to_string(),
            name: id.to_string(),
            description: Some(CoinDescription {
                en: Some(format!("About {}", id)),
            }),
            market_data: None,
        })
    }

    async fn news_articles(&self, count: usize) -> MarketApiResult<Vec<NewsArticle>> {
        self.track_call("news_articles")?;
        Ok(self
            .news
            .lock()
            .unwrap()
            .iter()
            .take(count)
            .cloned()
            .collect())
    }
}

#[allow(dead_code)]
pub fn unique_ids(coins: &[Coin]) -> HashSet<String> {
    coins.iter().map(|c| c.id.clone()).collect()
}
