//! End-to-end tests of the cache storage façade over real and mock drivers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use remcache::{
    BACKEND_DATABASE, Backend, BackendResult, CacheError, CacheStorage, CacheStorageExt,
    CacheValue, Codec, CodecError, DeleteStatus, PrefixedCache, Raw, RemoteCache,
    RemoteCacheOptions, TypeRegistry, provide_remote_cache,
};
use remcache_sqlite::SqliteBackend;
use remcache_test::MockBackend;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct CacheableRecord {
    text: String,
    number: i64,
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register::<CacheableRecord>();
    registry
}

fn sqlite_cache() -> RemoteCache {
    let backend = SqliteBackend::in_memory().expect("failed to open in-memory database");
    RemoteCache::new(Arc::new(backend), Codec::new(registry()))
}

#[tokio::test]
async fn can_put_get_and_delete_cached_bytes() {
    let client = sqlite_cache();
    let data_to_cache = Raw::from_static(b"some bytes");

    client.set_bytes("key1", data_to_cache, None).await.unwrap();

    let data = client.get_bytes("key1").await.unwrap();
    assert_eq!(data.as_ref(), b"some bytes");

    client.delete("key1").await.unwrap();

    let err = client.get_bytes("key1").await.unwrap_err();
    assert!(matches!(err, CacheError::NotFound));
}

#[tokio::test]
async fn cannot_fetch_expired_items() {
    let client = sqlite_cache();

    client
        .set_bytes("key1", Raw::from_static(b"some bytes"), Some(Duration::from_secs(1)))
        .await
        .unwrap();

    // Still readable before the deadline.
    assert!(client.get_bytes("key1").await.is_ok());

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let err = client.get_bytes("key1").await.unwrap_err();
    assert!(matches!(err, CacheError::NotFound));
}

#[tokio::test]
async fn typed_round_trip() {
    let client = sqlite_cache();
    let record = CacheableRecord {
        text: "hello".to_owned(),
        number: 42,
    };

    client.set("record", &record, None).await.unwrap();

    let cached: CacheableRecord = client.get("record").await.unwrap();
    assert_eq!(cached, record);
}

#[tokio::test]
async fn typed_set_requires_registration() {
    let backend = SqliteBackend::in_memory().unwrap();
    let client = RemoteCache::new(Arc::new(backend), Codec::new(TypeRegistry::new()));

    let record = CacheableRecord {
        text: "hello".to_owned(),
        number: 42,
    };
    let err = client.set("record", &record, None).await.unwrap_err();
    assert!(matches!(
        err,
        CacheError::Codec(CodecError::UnregisteredType(_))
    ));
}

#[tokio::test]
async fn typed_get_of_mismatched_bytes_is_a_decode_error() {
    let client = sqlite_cache();

    client
        .set_bytes("garbage", Raw::from_static(b"\xff\xff\xff\xff"), None)
        .await
        .unwrap();

    let err = client.get::<CacheableRecord>("garbage").await.unwrap_err();
    assert!(matches!(err, CacheError::Codec(CodecError::Decode(_))));
}

#[tokio::test]
async fn overwrite_resets_the_deadline() {
    let client = sqlite_cache();

    client
        .set_bytes("key", Raw::from_static(b"v1"), Some(Duration::from_secs(2)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1000)).await;

    client
        .set_bytes("key", Raw::from_static(b"v2"), Some(Duration::from_secs(2)))
        .await
        .unwrap();

    // 2.5s after the first write, inside the second write's window.
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let data = client.get_bytes("key").await.unwrap();
    assert_eq!(data.as_ref(), b"v2");

    // And the second deadline still applies.
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(client.get_bytes("key").await.is_err());
}

#[tokio::test]
async fn delete_of_absent_key_succeeds() {
    let client = sqlite_cache();
    client.delete("never-written").await.unwrap();
}

#[tokio::test]
async fn cache_prefix() {
    let mock = MockBackend::new();
    let cache = Arc::new(RemoteCache::new(
        Arc::new(mock.clone()),
        Codec::new(registry()),
    ));
    let prefix_cache = PrefixedCache::new(Arc::clone(&cache), "test/");

    // Set a value (with a prefix).
    prefix_cache
        .set_bytes("foo", Raw::from_static(b"bar"), Some(Duration::from_secs(3600)))
        .await
        .unwrap();

    // Get a value (with a prefix).
    let v = prefix_cache.get_bytes("foo").await.unwrap();
    assert_eq!(v.as_ref(), b"bar");

    // Get the value directly from the underlying cache; the prefix is in the key.
    let v = cache.get_bytes("test/foo").await.unwrap();
    assert_eq!(v.as_ref(), b"bar");

    // Without the prefix the entry is invisible.
    let err = cache.get_bytes("foo").await.unwrap_err();
    assert!(matches!(err, CacheError::NotFound));
}

#[tokio::test]
async fn prefixed_typed_operations_share_the_rewrite() {
    let mock = MockBackend::new();
    let cache = Arc::new(RemoteCache::new(
        Arc::new(mock.clone()),
        Codec::new(registry()),
    ));
    let prefix_cache = PrefixedCache::new(Arc::clone(&cache), "records/");

    let record = CacheableRecord {
        text: "prefixed".to_owned(),
        number: 1,
    };
    prefix_cache.set("r1", &record, None).await.unwrap();

    let via_inner: CacheableRecord = cache.get("records/r1").await.unwrap();
    assert_eq!(via_inner, record);
    assert!(cache.get::<CacheableRecord>("r1").await.is_err());
}

#[tokio::test]
async fn invalid_cache_type_returns_error() {
    let options = RemoteCacheOptions {
        backend: "invalid".to_owned(),
        ..Default::default()
    };
    let err = match provide_remote_cache(&options, registry()) {
        Err(err) => err,
        Ok(_) => panic!("expected an error"),
    };
    assert!(matches!(err, CacheError::InvalidCacheType(name) if name == "invalid"));
}

#[tokio::test]
async fn factory_wires_database_backend_and_prefix() {
    let options = RemoteCacheOptions {
        backend: BACKEND_DATABASE.to_owned(),
        prefix: Some("sessions/".to_owned()),
        ..Default::default()
    };
    let cache = provide_remote_cache(&options, registry()).unwrap();

    let record = CacheableRecord {
        text: "from factory".to_owned(),
        number: 9,
    };
    cache.set("s1", &record, None).await.unwrap();
    let cached: CacheableRecord = cache.get("s1").await.unwrap();
    assert_eq!(cached, record);
}

#[tokio::test]
async fn encrypted_values_are_opaque_in_the_medium() {
    let mock = MockBackend::new();
    let cache = RemoteCache::new(Arc::new(mock.clone()), Codec::new(registry()))
        .with_encryption(remcache::ValueEncryption::new(&[7u8; 32]).unwrap());

    cache
        .set_bytes("secret", Raw::from_static(b"plaintext"), None)
        .await
        .unwrap();

    let stored = mock.stored_bytes("secret").unwrap();
    assert_ne!(stored.as_ref(), b"plaintext");

    let read_back = cache.get_bytes("secret").await.unwrap();
    assert_eq!(read_back.as_ref(), b"plaintext");
}

#[tokio::test]
async fn wrong_encryption_key_fails_to_decrypt() {
    let mock = MockBackend::new();
    let writer = RemoteCache::new(Arc::new(mock.clone()), Codec::new(registry()))
        .with_encryption(remcache::ValueEncryption::new(&[1u8; 32]).unwrap());
    let reader = RemoteCache::new(Arc::new(mock.clone()), Codec::new(registry()))
        .with_encryption(remcache::ValueEncryption::new(&[2u8; 32]).unwrap());

    writer
        .set_bytes("secret", Raw::from_static(b"v"), None)
        .await
        .unwrap();

    let err = reader.get_bytes("secret").await.unwrap_err();
    assert!(matches!(err, CacheError::Crypto(_)));
}

/// Driver that never answers within a useful deadline.
struct StalledBackend;

#[async_trait]
impl Backend for StalledBackend {
    async fn read(&self, _key: &str) -> BackendResult<Option<CacheValue<Raw>>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(None)
    }

    async fn write(&self, _key: &str, _value: CacheValue<Raw>) -> BackendResult<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }

    async fn remove(&self, _key: &str) -> BackendResult<DeleteStatus> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(DeleteStatus::Missing)
    }
}

#[tokio::test]
async fn operations_respect_the_configured_deadline() {
    let cache = RemoteCache::new(Arc::new(StalledBackend), Codec::new(registry()))
        .with_timeout(Duration::from_millis(20));

    let err = cache.get_bytes("key").await.unwrap_err();
    assert!(matches!(err, CacheError::Timeout(_)));

    let err = cache
        .set_bytes("key", Raw::from_static(b"v"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::Timeout(_)));
}
