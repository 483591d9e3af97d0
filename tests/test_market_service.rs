//! Integration tests for the cache-or-fetch market service.

mod mocks;

use cryptodash::cache::{CacheRead, TtlCache};
use cryptodash::clock::ManualClock;
use cryptodash::config::CacheTtls;
use cryptodash::error::MarketApiError;
use cryptodash::metrics::Metrics;
use cryptodash::models::{Coin, Timeframe};
use cryptodash::services::{load_home, DataSource, MarketService, MarketServiceImpl};
use cryptodash::store::{KeyValueStore, MemoryStore};
use mocks::{coin, MockMarketClient};
use std::sync::Arc;
use std::time::Duration;

const START: i64 = 1_700_000_000_000;
const HOUR_MS: i64 = 60 * 60 * 1000;

struct Harness {
    client: MockMarketClient,
    clock: ManualClock,
    store: MemoryStore,
    service: MarketServiceImpl,
}

fn harness_with_store(store: MemoryStore) -> Harness {
    let client = MockMarketClient::new();
    let clock = ManualClock::new(START);
    let cache = TtlCache::new(Arc::new(store.clone()), Arc::new(clock.clone()));
    let service = MarketServiceImpl::new(
        Arc::new(client.clone()),
        cache,
        CacheTtls::default(),
        Metrics::new(),
    );
    Harness {
        client,
        clock,
        store,
        service,
    }
}

fn harness() -> Harness {
    harness_with_store(MemoryStore::new())
}

fn ranked(id: &str, name: &str, symbol: &str, rank: u32, price: f64) -> Coin {
    Coin {
        rank: Some(rank),
        price: Some(price),
        ..coin(id, name, symbol)
    }
}

fn top_four() -> Vec<Coin> {
    vec![
        ranked("bitcoin", "Bitcoin", "BTC", 1, 65_000.0),
        ranked("ethereum", "Ethereum", "ETH", 2, 3_200.0),
        ranked("tether", "Tether", "USDT", 3, 1.0),
        ranked("binancecoin", "BNB", "BNB", 4, 580.0),
    ]
}

#[tokio::test]
async fn test_miss_fetches_then_serves_from_cache() {
    let h = harness();
    h.client.set_top_coins(top_four());

    let first = h.service.top_coins(4).await.unwrap();
    assert_eq!(first.source, DataSource::Network);

    let second = h.service.top_coins(4).await.unwrap();
    assert_eq!(second.source, DataSource::Cache);
    assert_eq!(second.data, first.data);
    assert_eq!(h.client.get_call_count("top_coins"), 1);
    assert!(h.store.get("topCoins_4").unwrap().is_some());
}

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let h = harness();
    h.client.set_top_coins(top_four());

    h.service.top_coins(4).await.unwrap();
    h.clock.advance(4 * HOUR_MS);

    let again = h.service.top_coins(4).await.unwrap();
    assert_eq!(again.source, DataSource::Network);
    assert_eq!(h.client.get_call_count("top_coins"), 2);
}

#[tokio::test]
async fn test_stale_entry_served_when_upstream_fails() {
    let h = harness();
    h.client.set_top_coins(top_four());
    let original = h.service.top_coins(4).await.unwrap().data;

    h.clock.advance(5 * HOUR_MS);
    h.client.fail("top_coins", 500);

    let fetched = h.service.top_coins(4).await.unwrap();
    assert_eq!(fetched.source, DataSource::Stale);
    assert_eq!(fetched.data, original);
    assert_eq!(h.service.metrics().stale_served_total(), 1);
}

#[tokio::test]
async fn test_stale_entry_served_when_body_is_undecodable() {
    let h = harness();
    h.client.set_top_coins(top_four());
    let original = h.service.top_coins(4).await.unwrap().data;

    h.clock.advance(5 * HOUR_MS);
    h.client.fail_malformed("top_coins");

    let fetched = h.service.top_coins(4).await.unwrap();
    assert_eq!(fetched.source, DataSource::Stale);
    assert_eq!(fetched.data, original);
}

#[tokio::test]
async fn test_undecodable_body_without_cache_propagates() {
    let h = harness();
    h.client.fail_malformed("global_stats");

    match h.service.global_stats().await {
        Err(MarketApiError::Deserialization(_)) => {}
        other => panic!("Expected deserialization error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_failure_without_cache_propagates() {
    let h = harness();
    h.client.fail("top_coins", 429);

    match h.service.top_coins(4).await {
        Err(e @ MarketApiError::Upstream { .. }) => assert!(e.is_rate_limited()),
        other => panic!("Expected upstream error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_recovery_after_failure_writes_back() {
    let h = harness();
    h.client.fail("global_stats", 503);
    tokio_test::assert_err!(h.service.global_stats().await);

    h.client.recover("global_stats");
    let fetched = tokio_test::assert_ok!(h.service.global_stats().await);
    assert_eq!(fetched.source, DataSource::Network);

    let cached = h.service.global_stats().await.unwrap();
    assert_eq!(cached.source, DataSource::Cache);
    assert_eq!(cached.data.btc_dominance.value, 52.1);
}

#[tokio::test]
async fn test_top_four_ordered_by_rank() {
    let h = harness();
    h.client.set_top_coins(top_four());

    let coins = h.service.top_coins(4).await.unwrap().data;
    let ids: Vec<&str> = coins.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["bitcoin", "ethereum", "tether", "binancecoin"]);

    for (i, c) in coins.iter().enumerate() {
        assert_eq!(c.rank, Some(i as u32 + 1));
        assert!(c.price.unwrap() >= 0.0);
    }
}

#[tokio::test]
async fn test_trending_merges_prices_after_listing() {
    let h = harness();
    h.client.set_trending(vec![coin("solana", "Solana", "SOL")]);
    h.client.set_price("solana", 150.2, Some(-1.3));

    let fetched = h.service.trending_coins().await.unwrap();
    let solana = &fetched.data[0];

    assert_eq!(solana.display_price(), "$150.20");
    assert_eq!(solana.is_positive(), Some(false));
    assert_eq!(fetched.source, DataSource::Network);
    assert_eq!(h.client.calls(), vec!["trending_coins", "simple_prices"]);
    assert_eq!(h.client.price_requests(), vec![vec!["solana".to_string()]]);
}

#[tokio::test]
async fn test_trending_keeps_coins_without_quote() {
    let h = harness();
    h.client.set_trending(vec![
        coin("solana", "Solana", "SOL"),
        coin("obscure-token", "Obscure", "OBS"),
    ]);
    h.client.set_price("solana", 150.2, Some(-1.3));

    let coins = h.service.trending_coins().await.unwrap().data;
    assert_eq!(coins.len(), 2);
    assert_eq!(coins[1].id, "obscure-token");
    assert_eq!(coins[1].price, None);
    assert_eq!(coins[1].display_price(), "N/A");
}

#[tokio::test]
async fn test_trending_survives_price_failure() {
    let h = harness();
    h.client.set_trending(vec![coin("solana", "Solana", "SOL")]);
    h.client.fail("simple_prices", 500);

    let fetched = h.service.trending_coins().await.unwrap();
    assert_eq!(fetched.data.len(), 1);
    assert_eq!(fetched.data[0].price, None);
}

#[tokio::test]
async fn test_empty_inputs_are_skipped() {
    let h = harness();

    let search = h.service.search("   ").await.unwrap();
    assert_eq!(search.source, DataSource::Skipped);
    assert!(search.data.is_empty());

    let prices = h.service.coin_prices(&[]).await.unwrap();
    assert_eq!(prices.source, DataSource::Skipped);

    assert!(h.client.calls().is_empty());
}

#[tokio::test]
async fn test_search_is_cached_per_query() {
    let h = harness();

    let first = h.service.search("Doge").await.unwrap();
    assert_eq!(first.data[0].id, "doge");
    let second = h.service.search(" doge ").await.unwrap();
    assert_eq!(second.source, DataSource::Cache);
    assert_eq!(h.client.search_queries(), vec!["Doge"]);
}

#[tokio::test]
async fn test_refresh_bypasses_fresh_entry() {
    let h = harness();
    h.client.set_top_coins(top_four());
    h.service.top_coins(4).await.unwrap();

    let refreshed = h.service.refresh_top_coins(4).await.unwrap();
    assert_eq!(refreshed.source, DataSource::Network);
    assert_eq!(h.client.get_call_count("top_coins"), 2);

    h.client.fail("top_coins", 500);
    let fallback = h.service.refresh_top_coins(4).await.unwrap();
    assert_eq!(fallback.source, DataSource::Stale);
}

#[tokio::test]
async fn test_bitcoin_overview_cached_per_timeframe() {
    let h = harness();

    h.service.bitcoin_overview(Timeframe::Day).await.unwrap();
    h.service.bitcoin_overview(Timeframe::Week).await.unwrap();
    let day = h.service.bitcoin_overview(Timeframe::Day).await.unwrap();

    assert_eq!(day.source, DataSource::Cache);
    assert_eq!(h.client.get_call_count("bitcoin_overview"), 2);
    assert!(h.store.get("bitcoinData_24h").unwrap().is_some());
    assert!(h.store.get("bitcoinData_7d").unwrap().is_some());
}

#[tokio::test]
async fn test_rejected_write_still_returns_data() {
    let h = harness_with_store(MemoryStore::with_quota(16));
    h.client.set_top_coins(top_four());

    let fetched = h.service.top_coins(4).await.unwrap();
    assert_eq!(fetched.source, DataSource::Network);
    assert_eq!(fetched.data.len(), 4);
    assert_eq!(h.service.metrics().store_write_failures_total(), 1);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_news_count_and_cache_key() {
    let h = harness();
    let articles = (0..30)
        .map(|i| cryptodash::models::NewsArticle {
            id: format!("a-{}", i),
            ..Default::default()
        })
        .collect();
    h.client.set_news(articles);

    let news = h.service.news().await.unwrap();
    assert_eq!(news.data.len(), 20);

    let cache = TtlCache::new(Arc::new(h.store.clone()), Arc::new(h.clock.clone()));
    let read = cache.read::<Vec<cryptodash::models::NewsArticle>>(
        "cryptoNews",
        Duration::from_secs(3600),
    );
    assert!(matches!(read, CacheRead::Fresh(ref a) if a.len() == 20));
}

#[tokio::test]
async fn test_load_home_isolates_failures() {
    let h = harness();
    h.client.set_top_coins(top_four());
    h.client.set_trending(vec![coin("solana", "Solana", "SOL")]);
    h.client.fail("global_stats", 500);

    let home = load_home(&h.service, 4).await;

    assert!(home.global.is_err());
    assert_eq!(home.top_coins.as_ref().unwrap().data.len(), 4);
    assert_eq!(home.trending.as_ref().unwrap().data.len(), 1);
    assert!(home.news.is_ok());
    assert_eq!(home.failed_sections(), 1);
}
