//! Wire shapes of the CoinGecko v3 endpoints.
//!
//! These mirror the provider JSON closely and are converted into the models in
//! [`crate::models`] before leaving the client.

use crate::models::{ChartPoint, Coin, PriceMap, PriceQuote, SearchHit, Timeframe};
use serde::Deserialize;
use std::collections::HashMap;

/// Response of `/search/trending`.
#[derive(Debug, Deserialize)]
pub struct TrendingResponse {
    #[serde(default)]
    pub coins: Vec<TrendingCoin>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingCoin {
    pub item: TrendingItem,
}

#[derive(Debug, Deserialize)]
pub struct TrendingItem {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
}

impl From<TrendingItem> for Coin {
    fn from(item: TrendingItem) -> Self {
        Coin {
            id: item.id,
            name: item.name,
            symbol: item.symbol.to_uppercase(),
            rank: item.market_cap_rank,
            image: item.large.unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// One row of `/coins/markets`.
#[derive(Debug, Deserialize)]
pub struct MarketEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl MarketEntry {
    /// Convert into a [`Coin`] ranked by its position in the listing.
    pub fn into_coin(self, position: usize) -> Coin {
        Coin {
            id: self.id,
            name: self.name,
            symbol: self.symbol.to_uppercase(),
            rank: Some(position as u32 + 1),
            price: self.current_price,
            market_cap: self.market_cap,
            volume: self.total_volume,
            change_24h: self.price_change_percentage_24h,
            image: self.image.unwrap_or_default(),
        }
    }
}

/// Quote as returned by `/simple/price`. Unlisted ids come back with no `usd`.
#[derive(Debug, Deserialize)]
pub struct RawQuote {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
}

/// Keep only quotes that carry a USD price.
pub fn into_price_map(raw: HashMap<String, RawQuote>) -> PriceMap {
    raw.into_iter()
        .filter_map(|(id, quote)| {
            quote.usd.map(|usd| {
                (
                    id,
                    PriceQuote {
                        usd,
                        usd_24h_change: quote.usd_24h_change,
                    },
                )
            })
        })
        .collect()
}

/// Response of `/search`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
}

impl From<SearchCoin> for SearchHit {
    fn from(coin: SearchCoin) -> Self {
        SearchHit {
            id: coin.id,
            name: coin.name,
            symbol: coin.symbol.to_uppercase(),
            image: coin.large.or(coin.thumb).unwrap_or_default(),
            market_cap_rank: coin.market_cap_rank,
        }
    }
}

/// Response of `/global`.
#[derive(Debug, Deserialize)]
pub struct GlobalResponse {
    pub data: GlobalData,
}

#[derive(Debug, Deserialize)]
pub struct GlobalData {
    #[serde(default)]
    pub total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_change_percentage_24h_usd: Option<f64>,
}

/// Response of `/coins/{id}/market_chart`: `[epoch_ms, value]` pairs.
#[derive(Debug, Deserialize)]
pub struct MarketChartResponse {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
    #[serde(default)]
    pub market_caps: Vec<(f64, f64)>,
    #[serde(default)]
    pub total_volumes: Vec<(f64, f64)>,
}

/// Label `samples` for `timeframe` and down-sample them to `sample_size` points.
pub fn chart_points(samples: &[(f64, f64)], timeframe: Timeframe, sample_size: usize) -> Vec<ChartPoint> {
    let points: Vec<ChartPoint> = samples
        .iter()
        .map(|&(ts, value)| {
            let timestamp = ts as i64;
            ChartPoint {
                label: timeframe.label_for(timestamp),
                value,
                timestamp,
            }
        })
        .collect();
    crate::models::sample_series(&points, sample_size)
}

/// Response of `/coins/{id}`, restricted to the fields the dashboard reads.
#[derive(Debug, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<CoinDescription>,
    #[serde(default)]
    pub market_data: Option<CoinMarketData>,
}

impl CoinDetail {
    /// English description, if the provider has one.
    pub fn description_en(&self) -> Option<&str> {
        self.description.as_ref().and_then(|d| d.en.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct CoinDescription {
    #[serde(default)]
    pub en: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}
