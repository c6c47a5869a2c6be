//! Error types for the memory engine.

use std::time::Duration;
use thiserror::Error;

/// Errors from external inference providers (embedding, extraction,
/// generation).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<inference::Error> for ProviderError {
    fn from(err: inference::Error) -> Self {
        match err {
            inference::Error::Network(message) => ProviderError::Network(message),
            inference::Error::Api { status, message } => ProviderError::Api { status, message },
            inference::Error::Parse(message) => ProviderError::Parse(message),
        }
    }
}

/// Errors from persisting the long-term store.
///
/// Load-side corruption is not represented here: a store that cannot be
/// read is reset to empty and logged, never surfaced to callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
