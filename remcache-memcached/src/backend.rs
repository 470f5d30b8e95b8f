//! Memcached backend implementation.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use remcache_backend::{Backend, BackendError, BackendResult, DeleteStatus};
use remcache_core::{CacheValue, Raw};
use tracing::debug;

use crate::error::Error;

/// Memcached cache driver based on the memcache crate.
///
/// The client keeps its own connection pool and is shared by all callers.
/// Every operation runs on the blocking thread pool since the protocol
/// client is synchronous.
///
/// Memcached cannot report a key's remaining TTL, so values read back carry
/// no expire instant; a present key is by definition live.
#[derive(Clone)]
pub struct MemcachedBackend {
    client: Arc<memcache::Client>,
    label: String,
}

impl MemcachedBackend {
    /// Creates new backend with default settings (`memcache://127.0.0.1:11211`).
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Creates a new builder with default settings.
    #[must_use]
    pub fn builder() -> MemcachedBackendBuilder {
        MemcachedBackendBuilder::default()
    }
}

/// Builder for [`MemcachedBackend`].
pub struct MemcachedBackendBuilder {
    connection_info: String,
    label: String,
}

impl Default for MemcachedBackendBuilder {
    fn default() -> Self {
        Self {
            connection_info: "memcache://127.0.0.1:11211".to_owned(),
            label: "memcached".to_owned(),
        }
    }
}

impl MemcachedBackendBuilder {
    /// Sets connection info (host, port, protocol options) for the backend.
    pub fn server(mut self, connection_info: impl Into<String>) -> Self {
        self.connection_info = connection_info.into();
        self
    }

    /// Sets the label identifying this driver in logs.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Connects to the server and creates the backend.
    pub fn build(self) -> Result<MemcachedBackend, Error> {
        debug!(server = %self.connection_info, "connecting to memcached");
        let client = memcache::connect(self.connection_info.as_str())?;
        Ok(MemcachedBackend {
            client: Arc::new(client),
            label: self.label,
        })
    }
}

/// Relative exptimes above this are interpreted by the server as absolute
/// unix timestamps.
const EXPTIME_RELATIVE_LIMIT: i64 = 60 * 60 * 24 * 30;

/// Converts an absolute expire instant into a memcached `exptime`.
///
/// `exptime` is whole seconds, 0 meaning "never". Remainders round up so an
/// entry with 300ms left lives 1s rather than forever; an already-passed
/// deadline becomes the shortest representable TTL. Deadlines more than 30
/// days out must be sent as absolute unix timestamps.
fn exptime(value: &CacheValue<Raw>) -> u32 {
    match value.expire() {
        Some(expire) => {
            let remaining = expire.signed_duration_since(Utc::now()).num_milliseconds();
            if remaining <= 0 {
                return 1;
            }
            let seconds = (remaining + 999) / 1000;
            if seconds > EXPTIME_RELATIVE_LIMIT {
                expire.timestamp() as u32
            } else {
                seconds as u32
            }
        }
        None => 0,
    }
}

#[async_trait]
impl Backend for MemcachedBackend {
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Raw>>> {
        let client = Arc::clone(&self.client);
        let key = key.to_owned();

        let data = tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>, Error> {
            client.get::<Vec<u8>>(&key).map_err(Error::from)
        })
        .await
        .map_err(|e| BackendError::InternalError(Box::new(e)))?
        .map_err(BackendError::from)?;

        Ok(data.map(|data| CacheValue::eternal(Bytes::from(data))))
    }

    async fn write(&self, key: &str, value: CacheValue<Raw>) -> BackendResult<()> {
        let client = Arc::clone(&self.client);
        let key = key.to_owned();
        let expiration = exptime(&value);
        let data = value.into_inner();

        tokio::task::spawn_blocking(move || -> Result<(), Error> {
            client.set(&key, data.as_ref(), expiration).map_err(Error::from)
        })
        .await
        .map_err(|e| BackendError::InternalError(Box::new(e)))?
        .map_err(BackendError::from)
    }

    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus> {
        let client = Arc::clone(&self.client);
        let key = key.to_owned();

        let deleted = tokio::task::spawn_blocking(move || -> Result<bool, Error> {
            client.delete(&key).map_err(Error::from)
        })
        .await
        .map_err(|e| BackendError::InternalError(Box::new(e)))?
        .map_err(BackendError::from)?;

        if deleted {
            Ok(DeleteStatus::Deleted(1))
        } else {
            Ok(DeleteStatus::Missing)
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}
