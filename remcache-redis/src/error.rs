//! Error types for the Redis driver.

use remcache_backend::BackendError;
use redis::RedisError;

/// Error type for Redis driver operations.
///
/// Wraps errors from the underlying [`redis`] crate. Connectivity failures
/// are distinguished from protocol-level errors when converting to
/// [`BackendError`] so callers can tell a down cache apart from a broken
/// request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    #[error("redis backend error: {0}")]
    Redis(#[from] RedisError),
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        let Error::Redis(inner) = error;
        let connectivity = inner.is_io_error()
            || inner.is_timeout()
            || inner.is_connection_refusal()
            || inner.is_connection_dropped();
        if connectivity {
            BackendError::ConnectionError(Box::new(Error::Redis(inner)))
        } else {
            BackendError::InternalError(Box::new(Error::Redis(inner)))
        }
    }
}
