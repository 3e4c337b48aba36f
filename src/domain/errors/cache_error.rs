//! Cache store error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur inside a cache tier.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// I/O error during cache operation.
    #[error("IO error: {0}")]
    IoError(String),
    /// Entry metadata could not be (de)serialized.
    #[error("metadata error: {0}")]
    MetadataError(String),
}
