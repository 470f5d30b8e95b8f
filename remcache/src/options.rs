//! Backend selection from configuration.

use std::sync::Arc;

use remcache_backend::{Backend, BackendError};
use remcache_memcached::MemcachedBackend;
use remcache_redis::RedisBackend;
use remcache_sqlite::SqliteBackend;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{Codec, TypeRegistry};
use crate::crypto::ValueEncryption;
use crate::error::CacheError;
use crate::prefix::PrefixedCache;
use crate::storage::{CacheStorage, RemoteCache};

/// Backend name selecting the table-backed SQLite driver.
pub const BACKEND_DATABASE: &str = "database";
/// Backend name selecting the Redis driver.
pub const BACKEND_REDIS: &str = "redis";
/// Backend name selecting the memcached driver.
pub const BACKEND_MEMCACHED: &str = "memcached";

/// Configuration for constructing a remote cache.
///
/// `backend` names one of [`BACKEND_DATABASE`], [`BACKEND_REDIS`] or
/// [`BACKEND_MEMCACHED`]; any other value is rejected at construction. The
/// meaning of `connection_string` is medium-specific: a database file path
/// (empty for in-memory), a `redis://` URL, or a `memcache://` URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteCacheOptions {
    /// Which driver to construct.
    pub backend: String,
    /// Medium-specific connection parameters.
    pub connection_string: String,
    /// Optional namespace prefix applied to every key.
    pub prefix: Option<String>,
    /// Optional 32-byte key enabling encryption of values at rest.
    pub encryption_key: Option<String>,
}

/// Constructs the driver named by `options.backend`.
///
/// Fails with [`CacheError::InvalidCacheType`] for an unrecognized name; no
/// driver is created in that case.
pub fn create_backend(options: &RemoteCacheOptions) -> Result<Arc<dyn Backend>, CacheError> {
    let backend: Arc<dyn Backend> = match options.backend.as_str() {
        BACKEND_DATABASE => {
            let mut builder = SqliteBackend::builder();
            if !options.connection_string.is_empty() {
                builder = builder.path(&options.connection_string);
            }
            Arc::new(builder.build().map_err(BackendError::from)?)
        }
        BACKEND_REDIS => Arc::new(
            RedisBackend::builder()
                .server(options.connection_string.clone())
                .build()
                .map_err(BackendError::from)?,
        ),
        BACKEND_MEMCACHED => Arc::new(
            MemcachedBackend::builder()
                .server(options.connection_string.clone())
                .build()
                .map_err(BackendError::from)?,
        ),
        other => return Err(CacheError::InvalidCacheType(other.to_owned())),
    };
    debug!(backend = backend.name(), "remote cache backend created");
    Ok(backend)
}

/// Builds a ready-to-use cache storage from configuration.
///
/// Wires the selected driver to a codec over `registry`, enables value
/// encryption when a key is configured, and wraps the result in a
/// [`PrefixedCache`] when a non-empty prefix is configured.
pub fn provide_remote_cache(
    options: &RemoteCacheOptions,
    registry: TypeRegistry,
) -> Result<Arc<dyn CacheStorage>, CacheError> {
    let backend = create_backend(options)?;
    let mut cache = RemoteCache::new(backend, Codec::new(registry));

    if let Some(key) = &options.encryption_key {
        cache = cache.with_encryption(ValueEncryption::new(key.as_bytes())?);
    }

    let storage: Arc<dyn CacheStorage> = match options.prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => {
            let inner: Arc<dyn CacheStorage> = Arc::new(cache);
            Arc::new(PrefixedCache::new(inner, prefix))
        }
        _ => Arc::new(cache),
    };
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_name_is_rejected() {
        let options = RemoteCacheOptions {
            backend: "invalid".to_owned(),
            ..Default::default()
        };
        let err = match create_backend(&options) {
            Err(err) => err,
            Ok(_) => panic!("expected an error"),
        };
        assert!(matches!(err, CacheError::InvalidCacheType(name) if name == "invalid"));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: RemoteCacheOptions =
            serde_json::from_str(r#"{"backend": "database"}"#).unwrap();
        assert_eq!(options.backend, BACKEND_DATABASE);
        assert_eq!(options.connection_string, "");
        assert_eq!(options.prefix, None);
        assert_eq!(options.encryption_key, None);
    }

    #[test]
    fn database_backend_with_empty_connection_string_is_in_memory() {
        let options = RemoteCacheOptions {
            backend: BACKEND_DATABASE.to_owned(),
            ..Default::default()
        };
        let backend = create_backend(&options).unwrap();
        assert_eq!(backend.name(), "sqlite");
    }
}
