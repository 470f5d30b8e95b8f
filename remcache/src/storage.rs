//! The cache storage façade.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use remcache_backend::{Backend, DeleteStatus};
use remcache_core::{CacheValue, Raw};
use serde::{Serialize, de::DeserializeOwned};
use tracing::trace;

use crate::codec::Codec;
use crate::crypto::ValueEncryption;
use crate::error::CacheError;

/// The public contract every cache storage exposes to the rest of the
/// service: raw byte-array operations plus access to the codec the typed
/// extension methods use.
///
/// A `ttl` of `None` (or zero) means the entry never expires; a positive
/// duration makes the entry unreadable strictly after it elapses, measured
/// from the moment of the call. Writing to an existing key overwrites the
/// entry and resets its deadline.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Stores raw bytes at `key` with an optional time-to-live.
    async fn set_bytes(&self, key: &str, value: Raw, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    /// Fetches the raw bytes stored at `key`.
    ///
    /// Fails with [`CacheError::NotFound`] when the key is absent or
    /// expired.
    async fn get_bytes(&self, key: &str) -> Result<Raw, CacheError>;

    /// Removes the entry at `key`. Succeeds even if the key was absent.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// The codec used for typed operations.
    fn codec(&self) -> &Codec;
}

/// Typed operations layered over any [`CacheStorage`].
///
/// Provided for every storage implementation; the value's concrete type
/// must have been registered with the codec's [`TypeRegistry`] during
/// initialization.
///
/// [`TypeRegistry`]: crate::codec::TypeRegistry
#[async_trait]
pub trait CacheStorageExt: CacheStorage {
    /// Encodes `value` and stores it at `key`.
    async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<(), CacheError>
    where
        T: Serialize + Sync + 'static,
    {
        let data = self.codec().encode(value)?;
        self.set_bytes(key, data, ttl).await
    }

    /// Fetches the entry at `key` and decodes it into a `T`.
    async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: DeserializeOwned + 'static,
    {
        let data = self.get_bytes(key).await?;
        Ok(self.codec().decode(&data)?)
    }
}

impl<S: CacheStorage + ?Sized> CacheStorageExt for S {}

#[async_trait]
impl<S: CacheStorage + ?Sized> CacheStorage for Arc<S> {
    async fn set_bytes(
        &self,
        key: &str,
        value: Raw,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        (**self).set_bytes(key, value, ttl).await
    }

    async fn get_bytes(&self, key: &str) -> Result<Raw, CacheError> {
        (**self).get_bytes(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key).await
    }

    fn codec(&self) -> &Codec {
        (**self).codec()
    }
}

/// Cache storage over one backend driver and one codec.
///
/// Owns no persistent state of its own; the driver owns the connection to
/// the physical medium. Cheap to share behind an [`Arc`].
pub struct RemoteCache {
    backend: Arc<dyn Backend>,
    codec: Codec,
    encryption: Option<ValueEncryption>,
    op_timeout: Option<Duration>,
}

impl RemoteCache {
    /// Creates a cache storage over `backend` using `codec` for typed
    /// operations.
    pub fn new(backend: Arc<dyn Backend>, codec: Codec) -> Self {
        Self {
            backend,
            codec,
            encryption: None,
            op_timeout: None,
        }
    }

    /// Encrypts values before they reach the driver and decrypts them on
    /// the way back.
    #[must_use]
    pub fn with_encryption(mut self, encryption: ValueEncryption) -> Self {
        self.encryption = Some(encryption);
        self
    }

    /// Bounds every operation by a deadline. An elapsed deadline surfaces
    /// as [`CacheError::Timeout`].
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = Some(timeout);
        self
    }

    /// The driver this storage writes through.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    async fn deadline<F, T>(&self, operation: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>> + Send,
        T: Send,
    {
        match self.op_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| CacheError::Timeout(limit))?,
            None => operation.await,
        }
    }
}

/// Zero means "never expires" in the caller-facing contract.
fn normalize_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|ttl| !ttl.is_zero())
}

#[async_trait]
impl CacheStorage for RemoteCache {
    async fn set_bytes(
        &self,
        key: &str,
        value: Raw,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let payload = match &self.encryption {
            Some(encryption) => encryption.seal(&value)?,
            None => value,
        };
        let expire = normalize_ttl(ttl)
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| Utc::now() + ttl);

        trace!(backend = self.backend.name(), key, ?expire, "cache write");
        self.deadline(async {
            self.backend
                .write(key, CacheValue::new(payload, expire))
                .await
                .map_err(CacheError::from)
        })
        .await
    }

    async fn get_bytes(&self, key: &str) -> Result<Raw, CacheError> {
        let value = self
            .deadline(async { self.backend.read(key).await.map_err(CacheError::from) })
            .await?;

        // Drivers filter expired entries, but the deadline may pass between
        // the medium's check and this call returning.
        let value = match value {
            Some(value) if !value.is_expired() => value,
            _ => {
                trace!(backend = self.backend.name(), key, "cache miss");
                return Err(CacheError::NotFound);
            }
        };

        let data = value.into_inner();
        match &self.encryption {
            Some(encryption) => Ok(encryption.open(&data)?),
            None => Ok(data),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let status = self
            .deadline(async { self.backend.remove(key).await.map_err(CacheError::from) })
            .await?;
        if status == DeleteStatus::Missing {
            trace!(backend = self.backend.name(), key, "delete of absent key");
        }
        Ok(())
    }

    fn codec(&self) -> &Codec {
        &self.codec
    }
}
