//! Error types for the memcached driver.

use memcache::MemcacheError;
use remcache_backend::BackendError;

/// Error type for memcached driver operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying memcache client.
    #[error("memcached backend error: {0}")]
    Memcached(#[from] MemcacheError),
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        let Error::Memcached(inner) = error;
        match inner {
            MemcacheError::IOError(_) | MemcacheError::PoolError(_) => {
                BackendError::ConnectionError(Box::new(Error::Memcached(inner)))
            }
            _ => BackendError::InternalError(Box::new(Error::Memcached(inner))),
        }
    }
}
