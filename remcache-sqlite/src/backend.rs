//! SQLite backend implementation.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use remcache_backend::{Backend, BackendError, BackendResult, DeleteStatus};
use remcache_core::{CacheValue, Raw};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::Error;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS cache_data (
    cache_key  TEXT PRIMARY KEY,
    data       BLOB NOT NULL,
    expires    INTEGER,
    created_at INTEGER NOT NULL
)";

/// Table-backed cache driver storing entries as rows in a SQLite database.
///
/// Each row carries the serialized value, the creation instant, and an
/// optional absolute expiration instant (unix milliseconds). Reads filter
/// rows that have expired and delete them lazily; nothing else ever sweeps
/// the table.
///
/// Cloning is cheap; clones share the same underlying connection.
#[derive(Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    label: String,
}

impl SqliteBackend {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn builder() -> SqliteBackendBuilder {
        SqliteBackendBuilder::default()
    }

    /// In-memory database for tests. Data is lost when the backend is dropped.
    pub fn in_memory() -> Result<Self, Error> {
        Self::builder().build()
    }

    fn lock(conn: &Arc<Mutex<Connection>>) -> Result<MutexGuard<'_, Connection>, Error> {
        conn.lock().map_err(|_| Error::LockPoisoned)
    }
}

/// Builder for [`SqliteBackend`].
pub struct SqliteBackendBuilder {
    path: Option<PathBuf>,
    label: String,
}

impl Default for SqliteBackendBuilder {
    fn default() -> Self {
        Self {
            path: None,
            label: "sqlite".to_owned(),
        }
    }
}

impl SqliteBackendBuilder {
    /// Stores the cache table in the database file at `path`.
    ///
    /// Without this, the database lives only in memory.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the label identifying this driver in logs.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Opens the database and ensures the cache table exists.
    pub fn build(self) -> Result<SqliteBackend, Error> {
        let conn = match &self.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        conn.execute_batch(SCHEMA)?;
        debug!(path = ?self.path, "opened sqlite cache database");

        Ok(SqliteBackend {
            conn: Arc::new(Mutex::new(conn)),
            label: self.label,
        })
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Raw>>> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_owned();

        tokio::task::spawn_blocking(move || -> Result<Option<CacheValue<Raw>>, Error> {
            let conn = SqliteBackend::lock(&conn)?;
            let row = conn
                .query_row(
                    "SELECT data, expires FROM cache_data WHERE cache_key = ?1",
                    params![key],
                    |row| {
                        Ok((
                            row.get::<_, Vec<u8>>(0)?,
                            row.get::<_, Option<i64>>(1)?,
                        ))
                    },
                )
                .optional()?;

            let (data, expires) = match row {
                Some(row) => row,
                None => return Ok(None),
            };

            let expire = expires.and_then(DateTime::from_timestamp_millis);
            if let Some(expire) = expire {
                if expire <= Utc::now() {
                    // Dead row; reads are the only sweeper this table has.
                    conn.execute("DELETE FROM cache_data WHERE cache_key = ?1", params![key])?;
                    return Ok(None);
                }
            }

            Ok(Some(CacheValue::new(Bytes::from(data), expire)))
        })
        .await
        .map_err(|e| BackendError::InternalError(Box::new(e)))?
        .map_err(BackendError::from)
    }

    async fn write(&self, key: &str, value: CacheValue<Raw>) -> BackendResult<()> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_owned();
        let expires = value.expire().map(|e| e.timestamp_millis());
        let data = value.into_inner().to_vec();

        tokio::task::spawn_blocking(move || -> Result<(), Error> {
            let conn = SqliteBackend::lock(&conn)?;
            conn.execute(
                "INSERT INTO cache_data (cache_key, data, expires, created_at) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(cache_key) DO UPDATE SET \
                 data = excluded.data, expires = excluded.expires, created_at = excluded.created_at",
                params![key, data, expires, Utc::now().timestamp_millis()],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| BackendError::InternalError(Box::new(e)))?
        .map_err(BackendError::from)
    }

    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_owned();

        tokio::task::spawn_blocking(move || -> Result<DeleteStatus, Error> {
            let conn = SqliteBackend::lock(&conn)?;
            let changed = conn.execute("DELETE FROM cache_data WHERE cache_key = ?1", params![key])?;
            if changed > 0 {
                Ok(DeleteStatus::Deleted(changed as u32))
            } else {
                Ok(DeleteStatus::Missing)
            }
        })
        .await
        .map_err(|e| BackendError::InternalError(Box::new(e)))?
        .map_err(BackendError::from)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
