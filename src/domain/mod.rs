//! Domain value objects and types.
//!
//! Type-safe wrappers validated at construction time, so invalid identifiers never
//! reach cache keys or upstream requests.

pub mod coin_id;
pub mod errors;

pub use coin_id::CoinId;
pub use errors::ValidationError;
