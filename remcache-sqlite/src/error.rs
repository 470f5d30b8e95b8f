//! Error types for the SQLite driver.

use remcache_backend::BackendError;

/// Error type for SQLite driver operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying SQLite library.
    #[error("sqlite backend error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panicking writer.
    #[error("sqlite connection lock poisoned")]
    LockPoisoned,
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        // SQLite is an embedded medium; nothing here is a network failure.
        BackendError::InternalError(Box::new(error))
    }
}
