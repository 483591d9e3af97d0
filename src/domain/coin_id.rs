//! CoinId value object.

use super::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A provider coin identifier such as `bitcoin` or `usd-coin`.
///
/// Ids are joined with commas in batch price requests and cache keys, so an id
/// may not contain commas or whitespace.
///
/// # Example
///
/// ```
/// use cryptodash::domain::CoinId;
///
/// let id = CoinId::new("bitcoin").unwrap();
/// assert_eq!(id.as_str(), "bitcoin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoinId(String);

impl CoinId {
    /// Create a new CoinId.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyId` for an empty id and
    /// `ValidationError::InvalidCoinId` when it contains commas or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if id.chars().any(|c| c == ',' || c.is_whitespace()) {
            return Err(ValidationError::InvalidCoinId(id));
        }
        Ok(Self(id))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the underlying String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Serialize for CoinId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CoinId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CoinId::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CoinId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_id_valid() {
        let id = CoinId::new("usd-coin").unwrap();
        assert_eq!(id.as_str(), "usd-coin");
        assert_eq!(format!("{}", id), "usd-coin");
    }

    #[test]
    fn test_coin_id_rejects_empty() {
        assert_eq!(CoinId::new(""), Err(ValidationError::EmptyId));
    }

    #[test]
    fn test_coin_id_rejects_separators() {
        assert!(matches!(
            CoinId::new("bitcoin,ethereum"),
            Err(ValidationError::InvalidCoinId(_))
        ));
        assert!(CoinId::new("bit coin").is_err());
    }

    #[test]
    fn test_coin_id_serde() {
        let id = CoinId::new("solana").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"solana\"");

        let back: CoinId = serde_json::from_str("\"solana\"").unwrap();
        assert_eq!(back, id);

        let result: Result<CoinId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
