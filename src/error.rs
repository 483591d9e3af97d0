//! Error types for the market data layer.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use thiserror::Error;

/// Errors that can occur when talking to the upstream market-data API.
#[derive(Error, Debug)]
pub enum MarketApiError {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(String),

    /// API returned a non-success status code
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Failed to parse a JSON payload
    #[error("JSON parse error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl MarketApiError {
    /// HTTP status of an upstream rejection, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the upstream rejected the call for exceeding its rate limit.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}

/// Errors raised by a persistent key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The write would push the store past its byte quota
    #[error("Storage quota exceeded writing {key}: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Underlying file I/O failed
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be encoded or decoded
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The in-memory mirror lock was poisoned
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Convenience type alias for Results with MarketApiError
pub type MarketApiResult<T> = Result<T, MarketApiError>;

/// Convenience type alias for Results with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
