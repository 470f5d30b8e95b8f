//! Key-prefixing decorator for sharing one backend between logical caches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use remcache_core::Raw;

use crate::codec::Codec;
use crate::error::CacheError;
use crate::storage::CacheStorage;

/// Wraps a cache storage and rewrites every key to `prefix + key` before
/// delegating.
///
/// Two decorators with different prefixes over the same backend never
/// observe each other's entries for the same logical key. The rewrite is
/// plain concatenation, case-sensitive; any separator belongs in the prefix
/// itself. Entries remain reachable through the wrapped storage under the
/// rewritten key: prefixing isolates producers, it is not a security
/// boundary.
///
/// The decorator holds the wrapped storage by value; share it with an
/// [`Arc`] when the inner cache is also used directly.
pub struct PrefixedCache<S = Arc<dyn CacheStorage>> {
    inner: S,
    prefix: String,
}

impl<S: CacheStorage> PrefixedCache<S> {
    /// Creates a decorator adding `prefix` to every key.
    pub fn new(inner: S, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    /// The wrapped storage.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The prefix applied to every key.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn rewrite(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl<S: CacheStorage> CacheStorage for PrefixedCache<S> {
    async fn set_bytes(
        &self,
        key: &str,
        value: Raw,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.inner.set_bytes(&self.rewrite(key), value, ttl).await
    }

    async fn get_bytes(&self, key: &str) -> Result<Raw, CacheError> {
        self.inner.get_bytes(&self.rewrite(key)).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.delete(&self.rewrite(key)).await
    }

    fn codec(&self) -> &Codec {
        self.inner.codec()
    }
}
