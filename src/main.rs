//! CryptoDash - Main entry point
//!
//! Loads the home datasets once, then keeps trending and top coins fresh with
//! pollers until interrupted. Lines typed on stdin feed the debounced coin search.
//! Results are written to the log in place of a UI.

use anyhow::{Context, Result};
use cryptodash::client::{AsyncMarketClient, AsyncMarketClientImpl};
use cryptodash::error::MarketApiResult;
use cryptodash::format::{format_change, format_compact_usd};
use cryptodash::models::Coin;
use cryptodash::search::{SearchDebouncer, SearchSnapshot};
use cryptodash::services::{load_home, Fetched, MarketService, MarketServiceImpl};
use cryptodash::store::KeyValueStore;
use cryptodash::{
    CoinGeckoClient, Config, FileStore, Metrics, Poller, SystemClock, TtlCache, Watchlist,
};
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize logging (stderr only)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Starting CryptoDash with API URL: {}", config.api_base_url);

    let store = Arc::new(
        FileStore::open_with_quota(&config.store_path, config.store_quota_bytes)
            .with_context(|| format!("opening store at {}", config.store_path.display()))?,
    ) as Arc<dyn KeyValueStore>;

    let metrics = Metrics::new();
    let sync_client = CoinGeckoClient::new(&config).with_metrics(metrics.clone());
    let client = Arc::new(AsyncMarketClientImpl::new(sync_client)) as Arc<dyn AsyncMarketClient>;

    let cache = TtlCache::new(store.clone(), Arc::new(SystemClock));
    let service = Arc::new(
        MarketServiceImpl::new(client, cache, config.cache_ttls, metrics.clone())
            .with_news_count(config.news_article_count),
    ) as Arc<dyn MarketService>;

    let watchlist = Watchlist::new(store.clone());
    info!("Watchlist has {} coins", watchlist.load().len());

    let home = load_home(service.as_ref(), config.top_coins_limit).await;
    match &home.global {
        Ok(global) => info!(
            source = ?global.source,
            "Market cap {} ({}), sentiment {}",
            format_compact_usd(global.data.market_cap.value),
            format_change(global.data.market_cap.change),
            global.data.sentiment
        ),
        Err(e) => warn!("Global stats unavailable: {}", e),
    }
    match &home.news {
        Ok(news) => info!(source = ?news.source, "{} news articles", news.data.len()),
        Err(e) => warn!("News unavailable: {}", e),
    }

    let trending_poller = {
        let service = service.clone();
        Poller::spawn(
            "trending",
            config.price_poll_interval(),
            move || {
                let service = service.clone();
                async move { service.trending_coins().await }
            },
            |result: MarketApiResult<Fetched<Vec<Coin>>>| match result {
                Ok(fetched) => {
                    for coin in &fetched.data {
                        info!(
                            source = ?fetched.source,
                            "{} ({}) {} {}",
                            coin.name,
                            coin.symbol,
                            coin.display_price(),
                            coin.display_change().unwrap_or_default()
                        );
                    }
                }
                Err(e) => warn!("Trending coins unavailable: {}", e),
            },
        )
    };

    let top_coins_poller = {
        let service = service.clone();
        let limit = config.top_coins_limit;
        Poller::spawn(
            "top-coins",
            config.list_poll_interval(),
            move || {
                let service = service.clone();
                async move { service.top_coins(limit).await }
            },
            move |result: MarketApiResult<Fetched<Vec<Coin>>>| match result {
                Ok(fetched) => {
                    let watched = watchlist.retain_watched(fetched.data.clone());
                    info!(
                        source = ?fetched.source,
                        "{} top coins, {} on the watchlist",
                        fetched.data.len(),
                        watched.len()
                    );
                }
                Err(e) => warn!("Top coins unavailable: {}", e),
            },
        )
    };

    let debouncer = SearchDebouncer::new(service.clone(), config.search_debounce());
    let mut search_results = debouncer.subscribe();
    let mut search_input = spawn_stdin_reader();
    info!("Type a coin name to search, Ctrl-C to quit");

    let mut last_shown: Option<SearchSnapshot> = None;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal.context("waiting for shutdown signal")?;
                break;
            }
            Some(line) = search_input.recv() => debouncer.input(&line),
            Ok(()) = search_results.changed() => {
                let snapshot = search_results.borrow_and_update().clone();
                if search_settled(&snapshot, last_shown.as_ref()) {
                    log_search(&snapshot);
                    last_shown = Some(snapshot);
                }
            }
        }
    }
    info!("Shutting down");

    trending_poller.shutdown().await;
    top_coins_poller.shutdown().await;

    let summary = metrics.summary();
    info!(
        "HTTP requests: {} ({} errors, avg {:.1} ms), cache hits: {}, misses: {}, stale served: {}",
        summary.http_requests_total,
        summary.http_errors_total,
        summary.http_duration_avg_ms,
        summary.cache_hits_total,
        summary.cache_misses_total,
        summary.stale_served_total
    );

    info!("CryptoDash shutdown complete");
    Ok(())
}

/// Forward stdin lines from a dedicated thread.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Reading search input failed: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// A finished search whose outcome differs from the last one logged.
fn search_settled(snapshot: &SearchSnapshot, last: Option<&SearchSnapshot>) -> bool {
    snapshot.visible
        && !snapshot.loading
        && last.map_or(true, |last| {
            last.results != snapshot.results || last.error != snapshot.error
        })
}

fn log_search(snapshot: &SearchSnapshot) {
    if let Some(e) = &snapshot.error {
        warn!(query = %snapshot.query, "Search failed: {}", e);
        return;
    }
    info!(query = %snapshot.query, "{} matches", snapshot.results.len());
    for hit in &snapshot.results {
        info!("  {} ({}) {}", hit.name, hit.symbol, hit.id);
    }
}
