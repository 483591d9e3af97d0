//! Coin listings, price quotes and search hits.

use crate::format::{format_change, format_price};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A coin as shown in trending and top-coin lists.
///
/// All numeric fields are raw USD values. Trending coins arrive without a price;
/// `price` and `change_24h` stay `None` until a quote is merged in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    /// Provider identifier, stable across the session
    pub id: String,

    pub name: String,

    /// Ticker symbol, upper-cased
    pub symbol: String,

    /// Position by market cap (1 = largest)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    /// 24h price change in percent
    #[serde(default)]
    pub change_24h: Option<f64>,

    /// Logo URL
    #[serde(default)]
    pub image: String,
}

impl Coin {
    /// Formatted price, or `N/A` when unpriced.
    pub fn display_price(&self) -> String {
        format_price(self.price)
    }

    /// Formatted signed 24h change, if known.
    pub fn display_change(&self) -> Option<String> {
        self.change_24h.map(format_change)
    }

    /// Whether the 24h change is a gain, if known.
    pub fn is_positive(&self) -> Option<bool> {
        self.change_24h.map(|c| c > 0.0)
    }

    /// Copy the price fields of `quote` onto this coin.
    pub fn with_quote(mut self, quote: &PriceQuote) -> Self {
        self.price = Some(quote.usd);
        self.change_24h = quote.usd_24h_change;
        self
    }
}

/// Spot USD price of one coin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    pub usd: f64,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
}

/// Price quotes keyed by coin id.
pub type PriceMap = BTreeMap<String, PriceQuote>;

/// Merge quotes onto a coin list.
///
/// Coins without a quote are kept unchanged; order is preserved.
pub fn merge_quotes(coins: Vec<Coin>, quotes: &PriceMap) -> Vec<Coin> {
    coins
        .into_iter()
        .map(|coin| match quotes.get(&coin.id) {
            Some(quote) => coin.with_quote(quote),
            None => coin,
        })
        .collect()
}

/// One free-text search match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
}

/// Column a coin table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoinSortField {
    #[default]
    Rank,
    Name,
    Price,
    Change24h,
    MarketCap,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction, for toggling a column header.
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Keep coins whose name or symbol contains `term` (case-insensitive).
pub fn filter_coins<'a>(coins: &'a [Coin], term: &str) -> Vec<&'a Coin> {
    let term = term.trim().to_lowercase();
    coins
        .iter()
        .filter(|coin| {
            term.is_empty()
                || coin.name.to_lowercase().contains(&term)
                || coin.symbol.to_lowercase().contains(&term)
        })
        .collect()
}

/// Sort coins in place. Missing values sort last in either direction.
pub fn sort_coins(coins: &mut [Coin], field: CoinSortField, direction: SortDirection) {
    coins.sort_by(|a, b| match field {
        CoinSortField::Rank => compare_missing_last(
            a.rank.map(f64::from),
            b.rank.map(f64::from),
            direction,
        ),
        CoinSortField::Name => {
            let ord = a.name.to_lowercase().cmp(&b.name.to_lowercase());
            apply_direction(ord, direction)
        }
        CoinSortField::Price => compare_missing_last(a.price, b.price, direction),
        CoinSortField::Change24h => {
            compare_missing_last(a.change_24h, b.change_24h, direction)
        }
        CoinSortField::MarketCap => {
            compare_missing_last(a.market_cap, b.market_cap, direction)
        }
        CoinSortField::Volume => compare_missing_last(a.volume, b.volume, direction),
    });
}

fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn compare_missing_last(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            apply_direction(x.partial_cmp(&y).unwrap_or(Ordering::Equal), direction)
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, rank: Option<u32>, price: Option<f64>) -> Coin {
        Coin {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id[..3.min(id.len())].to_uppercase(),
            rank,
            price,
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_quote_onto_trending_coin() {
        let trending = vec![coin("solana", Some(5), None), coin("pepe", None, None)];
        let mut quotes = PriceMap::new();
        quotes.insert(
            "solana".to_string(),
            PriceQuote {
                usd: 150.2,
                usd_24h_change: Some(-1.3),
            },
        );

        let merged = merge_quotes(trending, &quotes);

        assert_eq!(merged[0].display_price(), "$150.20");
        assert_eq!(merged[0].is_positive(), Some(false));
        assert_eq!(merged[0].display_change().as_deref(), Some("-1.30%"));

        // No quote: unchanged, not dropped
        assert_eq!(merged[1].price, None);
        assert_eq!(merged[1].is_positive(), None);
        assert_eq!(merged[1].display_price(), "N/A");
    }

    #[test]
    fn test_coin_json_field_names() {
        let c = Coin {
            id: "bitcoin".to_string(),
            market_cap: Some(1.0),
            change_24h: Some(2.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("marketCap").is_some());
        assert!(json.get("change24h").is_some());
        assert!(json.get("rank").is_none());
    }

    #[test]
    fn test_filter_by_name_or_symbol() {
        let coins = vec![
            Coin {
                name: "Bitcoin".to_string(),
                symbol: "BTC".to_string(),
                ..Default::default()
            },
            Coin {
                name: "Ethereum".to_string(),
                symbol: "ETH".to_string(),
                ..Default::default()
            },
        ];

        assert_eq!(filter_coins(&coins, "btc").len(), 1);
        assert_eq!(filter_coins(&coins, "ETHER")[0].symbol, "ETH");
        assert_eq!(filter_coins(&coins, "  ").len(), 2);
    }

    #[test]
    fn test_sort_by_price_missing_last() {
        let mut coins = vec![
            coin("aaa", Some(3), Some(10.0)),
            coin("bbb", Some(1), None),
            coin("ccc", Some(2), Some(20.0)),
        ];

        sort_coins(&mut coins, CoinSortField::Price, SortDirection::Descending);
        let ids: Vec<_> = coins.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ccc", "aaa", "bbb"]);

        sort_coins(&mut coins, CoinSortField::Rank, SortDirection::Ascending);
        let ids: Vec<_> = coins.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["bbb", "ccc", "aaa"]);
    }

    #[test]
    fn test_sort_direction_flip() {
        assert_eq!(SortDirection::Ascending.flipped(), SortDirection::Descending);
    }
}
