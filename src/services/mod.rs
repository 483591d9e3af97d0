//! Application service layer.
//!
//! Services contain the freshness policy and orchestrate the upstream client and
//! the TTL cache. They provide a clean boundary between the refresh drivers
//! (pollers, search debouncer) and the data access layer.

mod home;
mod market_service;

pub use home::{load_home, HomeSnapshot};
pub use market_service::{
    DataSource, Fetched, MarketService, MarketServiceImpl, DEFAULT_NEWS_COUNT, MARKET_DATA_KEY,
    NEWS_KEY, TRENDING_KEY,
};
