//! Global market statistics and bitcoin chart data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bitcoin 24h move (percent) above which the market reads as bullish.
pub const SENTIMENT_THRESHOLD_PERCENT: f64 = 3.0;

/// One point of a chart series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    /// Axis label (`13h`, `Mon`, `Jan 5`)
    pub label: String,
    pub value: f64,
    /// Epoch millis of the sample
    pub timestamp: i64,
}

/// A headline figure with its 24h change and a small trend series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MarketMetric {
    pub value: f64,
    pub change: f64,
    #[serde(default)]
    pub series: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct DominanceMetric {
    pub value: f64,
    pub change: f64,
}

/// Coarse market mood derived from bitcoin's 24h change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

impl Sentiment {
    pub fn from_price_change(change_24h: f64) -> Self {
        if change_24h > SENTIMENT_THRESHOLD_PERCENT {
            Sentiment::Bullish
        } else if change_24h < -SENTIMENT_THRESHOLD_PERCENT {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Bullish => "Bullish",
            Sentiment::Neutral => "Neutral",
            Sentiment::Bearish => "Bearish",
        };
        f.write_str(s)
    }
}

/// Market-wide aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMarketStats {
    pub market_cap: MarketMetric,
    pub volume: MarketMetric,
    pub btc_dominance: DominanceMetric,
    pub sentiment: Sentiment,
}

/// Chart range for the bitcoin overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
    All,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::Day,
        Timeframe::Week,
        Timeframe::Month,
        Timeframe::Quarter,
        Timeframe::Year,
        Timeframe::All,
    ];

    /// Label used in cache keys and UI selectors.
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Day => "24h",
            Timeframe::Week => "7d",
            Timeframe::Month => "30d",
            Timeframe::Quarter => "90d",
            Timeframe::Year => "1y",
            Timeframe::All => "all",
        }
    }

    /// Value of the upstream `days` query parameter.
    pub fn days_param(self) -> &'static str {
        match self {
            Timeframe::Day => "1",
            Timeframe::Week => "7",
            Timeframe::Month => "30",
            Timeframe::Quarter => "90",
            Timeframe::Year => "365",
            Timeframe::All => "max",
        }
    }

    /// Axis label for a sample taken at `timestamp_ms`.
    pub fn label_for(self, timestamp_ms: i64) -> String {
        let Some(at) = DateTime::<Utc>::from_timestamp_millis(timestamp_ms) else {
            return String::new();
        };
        match self {
            Timeframe::Day => at.format("%-Hh").to_string(),
            Timeframe::Week => at.format("%a").to_string(),
            _ => at.format("%b %-d").to_string(),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown timeframe: {}", s))
    }
}

/// Bitcoin price with a chart for one timeframe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BitcoinOverview {
    pub price: f64,
    pub price_change_24h: f64,
    pub series: Vec<ChartPoint>,
}

/// Down-sample `data` to at most `sample_size` points with a fixed stride.
pub fn sample_series<T: Clone>(data: &[T], sample_size: usize) -> Vec<T> {
    if sample_size == 0 {
        return Vec::new();
    }
    if data.len() <= sample_size {
        return data.to_vec();
    }
    let step = data.len() / sample_size;
    (0..sample_size)
        .map(|i| data[(i * step).min(data.len() - 1)].clone())
        .collect()
}
