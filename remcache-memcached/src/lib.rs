#![warn(missing_docs)]
//! Memcached driver for remcache.
//!
//! Speaks the memcache protocol through a pooled synchronous client bridged
//! onto the async runtime with `spawn_blocking`. Expiry is delegated to the
//! server's native `exptime`, which counts whole seconds; sub-second
//! deadlines are rounded up so a short-lived entry never dies early.
//!
//! Memcached limits keys to 250 bytes without whitespace or control
//! characters; callers own key hygiene.

pub mod backend;
pub mod error;

pub use backend::{MemcachedBackend, MemcachedBackendBuilder};
pub use error::Error;
