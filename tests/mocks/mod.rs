pub mod mock_market_client;

#[allow(unused_imports)]
pub use mock_market_client::{coin, unique_ids, MockMarketClient};
