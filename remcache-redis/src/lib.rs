#![warn(missing_docs)]
//! Redis driver for remcache.
//!
//! Stores each cache entry under its key as a plain string value and
//! delegates expiry to Redis's native per-key TTL. The connection is
//! established lazily on the first operation and shared by all callers
//! through a [`ConnectionManager`].
//!
//! [`ConnectionManager`]: redis::aio::ConnectionManager

pub mod backend;
pub mod error;

pub use backend::{RedisBackend, RedisBackendBuilder};
pub use error::Error;
