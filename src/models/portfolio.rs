//! Mock portfolio allocation persisted in the local store.

use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Store key holding the portfolio allocation.
pub const PORTFOLIO_KEY: &str = "portfolioData";

/// One holding and its share of the portfolio in percent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioAsset {
    pub coin: String,
    pub symbol: String,
    pub allocation: f64,
}

impl PortfolioAsset {
    fn new(coin: &str, symbol: &str, allocation: f64) -> Self {
        Self {
            coin: coin.to_string(),
            symbol: symbol.to_string(),
            allocation,
        }
    }
}

/// Allocation shown before the user has saved anything.
pub fn default_allocation() -> Vec<PortfolioAsset> {
    vec![
        PortfolioAsset::new("Bitcoin", "BTC", 45.0),
        PortfolioAsset::new("Ethereum", "ETH", 20.0),
        PortfolioAsset::new("Solana", "SOL", 15.0),
        PortfolioAsset::new("Cardano", "ADA", 10.0),
        PortfolioAsset::new("Polkadot", "DOT", 10.0),
    ]
}

/// Portfolio persisted under [`PORTFOLIO_KEY`].
#[derive(Clone)]
pub struct Portfolio {
    store: Arc<dyn KeyValueStore>,
}

impl Portfolio {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved assets, or the default allocation when nothing usable is stored.
    pub fn load(&self) -> Vec<PortfolioAsset> {
        match self.store.get(PORTFOLIO_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored portfolio is malformed, using defaults");
                default_allocation()
            }),
            Ok(None) => default_allocation(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read portfolio, using defaults");
                default_allocation()
            }
        }
    }

    /// Append a holding for `coin_id` with a zero allocation.
    ///
    /// The display name is the capitalized id and the symbol its first three
    /// letters. Returns the resulting asset list.
    pub fn add_asset(&self, coin_id: &str) -> Vec<PortfolioAsset> {
        let coin_id = coin_id.trim();
        let mut assets = self.load();
        if coin_id.is_empty() {
            return assets;
        }

        let mut chars = coin_id.chars();
        let coin = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        let symbol: String = coin_id.chars().take(3).collect::<String>().to_uppercase();

        assets.push(PortfolioAsset {
            coin,
            symbol,
            allocation: 0.0,
        });
        self.save(&assets);
        assets
    }

    /// Total of all allocations, in percent.
    pub fn total_allocation(&self) -> f64 {
        self.load().iter().map(|a| a.allocation).sum()
    }

    fn save(&self, assets: &[PortfolioAsset]) -> bool {
        let result = serde_json::to_string(assets)
            .map_err(crate::error::StoreError::from)
            .and_then(|raw| self.store.set(PORTFOLIO_KEY, &raw));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save portfolio");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_defaults_when_empty() {
        let portfolio = Portfolio::new(Arc::new(MemoryStore::new()));
        let assets = portfolio.load();
        assert_eq!(assets.len(), 5);
        assert_eq!(assets[0].symbol, "BTC");
        assert_eq!(portfolio.total_allocation(), 100.0);
    }

    #[test]
    fn test_add_asset_persists() {
        let store = MemoryStore::new();
        let portfolio = Portfolio::new(Arc::new(store.clone()));

        let assets = portfolio.add_asset("dogecoin");
        let added = assets.last().unwrap();
        assert_eq!(added.coin, "Dogecoin");
        assert_eq!(added.symbol, "DOG");
        assert_eq!(added.allocation, 0.0);

        let reloaded = Portfolio::new(Arc::new(store)).load();
        assert_eq!(reloaded.len(), 6);
    }

    #[test]
    fn test_malformed_store_falls_back_to_defaults() {
        let store = MemoryStore::new();
        store.set(PORTFOLIO_KEY, "[{\"coin\":1}]").unwrap();
        assert_eq!(Portfolio::new(Arc::new(store)).load(), default_allocation());
    }
}
