//! Data models for market entities and user data.
//!
//! Coins, price quotes, market statistics and news are derived data that the market
//! service caches; the watchlist and portfolio are user data persisted without expiry.

pub mod coin;
pub mod market;
pub mod news;
pub mod portfolio;
pub mod watchlist;

pub use coin::{
    filter_coins, merge_quotes, sort_coins, Coin, CoinSortField, PriceMap, PriceQuote,
    SearchHit, SortDirection,
};
pub use market::{
    sample_series, BitcoinOverview, ChartPoint, DominanceMetric, GlobalMarketStats,
    MarketMetric, Sentiment, Timeframe,
};
pub use news::NewsArticle;
pub use portfolio::{Portfolio, PortfolioAsset};
pub use watchlist::Watchlist;
