use std::sync::Arc;

use async_trait::async_trait;
use remcache_core::{CacheValue, Raw};

use crate::{BackendError, DeleteStatus};

/// Convenience alias for driver operation results.
pub type BackendResult<T> = Result<T, BackendError>;

/// Raw byte-array cache operations against one physical storage medium.
///
/// Keys are caller-chosen opaque strings, unique within the medium's
/// namespace. Values are opaque byte sequences; any typed meaning is imposed
/// by the codec layered above.
///
/// Contract every implementation must honor identically:
///
/// - [`read`](Backend::read) returns `Ok(None)` for keys that are absent *or*
///   expired as of the call. Media without native expiry must filter (and may
///   lazily delete) dead entries on read.
/// - [`write`](Backend::write) overwrites any existing entry at the key and
///   resets its deadline to the `expire` instant carried inside the value;
///   `None` means the entry never expires.
/// - [`remove`](Backend::remove) reports [`DeleteStatus::Missing`] rather
///   than an error when the key was already gone, even if the medium itself
///   complains about deleting a non-existent key.
/// - Connectivity failures surface as [`BackendError::ConnectionError`],
///   never as an absent key.
///
/// Drivers share one connection or handle across all callers and must be
/// safe for concurrent use without external locking.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetches the live entry stored at `key`, if any.
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Raw>>>;

    /// Stores `value` at `key`, replacing any previous entry.
    async fn write(&self, key: &str, value: CacheValue<Raw>) -> BackendResult<()>;

    /// Removes the entry at `key` if present.
    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus>;

    /// Short label identifying this driver in logs.
    fn name(&self) -> &str {
        "backend"
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend> {
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
