//! Home surface loading.

use crate::error::MarketApiResult;
use crate::models::{Coin, GlobalMarketStats, NewsArticle};
use crate::services::{Fetched, MarketService};

/// Everything the home surface shows, each section loaded independently.
#[derive(Debug)]
pub struct HomeSnapshot {
    pub trending: MarketApiResult<Fetched<Vec<Coin>>>,
    pub top_coins: MarketApiResult<Fetched<Vec<Coin>>>,
    pub global: MarketApiResult<Fetched<GlobalMarketStats>>,
    pub news: MarketApiResult<Fetched<Vec<NewsArticle>>>,
}

impl HomeSnapshot {
    /// Number of sections that have no data to show.
    pub fn failed_sections(&self) -> usize {
        [
            self.trending.is_err(),
            self.top_coins.is_err(),
            self.global.is_err(),
            self.news.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// Load the home datasets concurrently. A failing section does not affect the others.
pub async fn load_home(service: &dyn MarketService, top_coins_limit: usize) -> HomeSnapshot {
    let (trending, top_coins, global, news) = futures::join!(
        service.trending_coins(),
        service.top_coins(top_coins_limit),
        service.global_stats(),
        service.news()
    );

    let snapshot = HomeSnapshot {
        trending,
        top_coins,
        global,
        news,
    };
    tracing::info!(
        failed_sections = snapshot.failed_sections(),
        "Home datasets loaded"
    );
    snapshot
}
