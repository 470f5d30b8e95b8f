//! Redis backend implementation.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use redis::{Client, aio::ConnectionManager};
use remcache_backend::{Backend, BackendError, BackendResult, DeleteStatus};
use remcache_core::{CacheValue, Raw};
use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::Error;

/// Redis cache driver based on the redis-rs crate.
///
/// Uses a [`ConnectionManager`] for asynchronous network interaction; the
/// manager reconnects on its own when the connection drops. Expiry is
/// delegated to Redis: entries with a deadline are written with a `PEXPIRE`,
/// so an expired key simply stops existing on the server.
///
/// [`ConnectionManager`]: redis::aio::ConnectionManager
#[derive(Clone)]
pub struct RedisBackend {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    label: String,
}

impl RedisBackend {
    /// Creates new backend with default settings (`redis://127.0.0.1/`).
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Creates a new builder with default settings.
    #[must_use]
    pub fn builder() -> RedisBackendBuilder {
        RedisBackendBuilder::default()
    }

    /// Lazily creates the shared connection via [`ConnectionManager`].
    async fn connection(&self) -> Result<&ConnectionManager, BackendError> {
        trace!("get redis connection manager");
        let manager = self
            .connection
            .get_or_try_init(|| {
                trace!("initialize new redis connection manager");
                self.client.get_connection_manager()
            })
            .await
            .map_err(Error::from)?;
        Ok(manager)
    }
}

/// Builder for [`RedisBackend`].
pub struct RedisBackendBuilder {
    connection_info: String,
    label: String,
}

impl Default for RedisBackendBuilder {
    fn default() -> Self {
        Self {
            connection_info: "redis://127.0.0.1/".to_owned(),
            label: "redis".to_owned(),
        }
    }
}

impl RedisBackendBuilder {
    /// Sets connection info (host, port, database, etc.) for the backend.
    pub fn server(mut self, connection_info: impl Into<String>) -> Self {
        self.connection_info = connection_info.into();
        self
    }

    /// Sets the label identifying this driver in logs.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Creates the backend. The server is not contacted until the first
    /// operation.
    pub fn build(self) -> Result<RedisBackend, Error> {
        Ok(RedisBackend {
            client: Client::open(self.connection_info)?,
            connection: OnceCell::new(),
            label: self.label,
        })
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Raw>>> {
        let mut con = self.connection().await?.clone();

        // Pipeline: GET + PTTL so the expire instant can be reconstructed.
        // PTTL returns -2 if the key doesn't exist, -1 if it has no TTL,
        // otherwise the remaining milliseconds.
        let (data, pttl): (Option<Vec<u8>>, i64) = redis::pipe()
            .cmd("GET")
            .arg(key)
            .cmd("PTTL")
            .arg(key)
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;

        let data = match data {
            Some(data) => Bytes::from(data),
            None => return Ok(None),
        };

        let expire = if pttl > 0 {
            Some(Utc::now() + chrono::Duration::milliseconds(pttl))
        } else {
            None
        };

        Ok(Some(CacheValue::new(data, expire)))
    }

    async fn write(&self, key: &str, value: CacheValue<Raw>) -> BackendResult<()> {
        let mut con = self.connection().await?.clone();

        let expire = value.expire();
        let data = value.into_inner();

        // Pipeline: SET + optional PEXPIRE computed from the expire instant.
        let mut pipe = redis::pipe();
        pipe.cmd("SET").arg(key).arg(data.as_ref()).ignore();
        if let Some(expire) = expire {
            let remaining = expire
                .signed_duration_since(Utc::now())
                .num_milliseconds()
                .max(1);
            pipe.cmd("PEXPIRE").arg(key).arg(remaining).ignore();
        }

        pipe.query_async::<()>(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus> {
        let mut con = self.connection().await?.clone();

        let deleted: i32 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;

        if deleted > 0 {
            Ok(DeleteStatus::Deleted(deleted as u32))
        } else {
            Ok(DeleteStatus::Missing)
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}
