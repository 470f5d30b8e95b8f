//! The cache error taxonomy callers match on.

use std::time::Duration;

use remcache_backend::BackendError;
use thiserror::Error;

use crate::codec::CodecError;
use crate::crypto::CryptoError;

/// Errors surfaced by the cache storage façade.
///
/// A miss ([`CacheError::NotFound`]) is expected in normal operation and is
/// never conflated with an unreachable medium
/// ([`CacheError::Unavailable`]), so callers can choose to retry, degrade,
/// or fail the enclosing request. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Key absent or expired as of the call.
    #[error("cache item not found")]
    NotFound,

    /// Unknown backend name at construction. Fatal at start-up.
    #[error("unknown remote cache backend: {0}")]
    InvalidCacheType(String),

    /// Typed value could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Value encryption or decryption failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The storage medium is unreachable, refused the connection, or timed
    /// out on the wire.
    #[error("cache backend unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The configured per-operation deadline elapsed before the driver
    /// answered.
    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),

    /// The driver failed internally (state or computation error).
    #[error("cache backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<BackendError> for CacheError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::ConnectionError(source) => CacheError::Unavailable(source),
            BackendError::InternalError(source) => CacheError::Backend(source),
        }
    }
}

impl CacheError {
    /// Whether this error is an ordinary cache miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound)
    }
}
