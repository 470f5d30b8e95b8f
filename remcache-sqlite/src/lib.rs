#![warn(missing_docs)]
//! SQLite table-backed driver for remcache.
//!
//! Entries live as rows of a single `cache_data` table keyed by the cache
//! key. SQLite has no native expiry, so the driver persists the absolute
//! expiration instant per row, filters dead rows out of every read, and
//! lazily deletes them on the way past. Useful when the deployment already
//! carries a database and no dedicated cache server is available.

pub mod backend;
pub mod error;

pub use backend::{SqliteBackend, SqliteBackendBuilder};
pub use error::Error;
