//! Error Types

use thiserror::Error;

/// Result type alias for cart persistence
pub type Result<T> = std::result::Result<T, CartError>;

/// Cart persistence errors
///
/// Cart operations themselves never fail; these surface only from storage
/// adapters and are logged by the store.
#[derive(Error, Debug)]
pub enum CartError {
    /// Storage backend rejected the read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cart could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
