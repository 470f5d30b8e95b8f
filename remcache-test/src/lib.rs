//! In-memory mock driver for exercising remcache layers without a real
//! storage medium.
//!
//! The mock honors the full driver contract (expired entries read as
//! missing and are dropped lazily) and additionally counts every operation
//! so façade-level tests can assert how the layers above actually talked to
//! the driver.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use remcache_backend::{Backend, BackendResult, DeleteStatus};
use remcache_core::{CacheValue, Raw};

/// Operation counters shared by clones of a [`MockBackend`].
#[derive(Debug, Default)]
pub struct BackendCounters {
    reads: AtomicUsize,
    hits: AtomicUsize,
    misses: AtomicUsize,
    writes: AtomicUsize,
    removes: AtomicUsize,
}

impl BackendCounters {
    /// Total read operations observed.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Reads that returned a live entry.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Reads that found nothing (absent or expired).
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::SeqCst)
    }

    /// Total write operations observed.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Total remove operations observed.
    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        self.reads.store(0, Ordering::SeqCst);
        self.hits.store(0, Ordering::SeqCst);
        self.misses.store(0, Ordering::SeqCst);
        self.writes.store(0, Ordering::SeqCst);
        self.removes.store(0, Ordering::SeqCst);
    }
}

/// In-memory cache driver backed by a concurrent map.
///
/// Clones share the same map and counters.
#[derive(Clone, Debug, Default)]
pub struct MockBackend {
    entries: Arc<DashMap<String, CacheValue<Raw>>>,
    counters: Arc<BackendCounters>,
}

impl MockBackend {
    /// Creates an empty mock driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared operation counters.
    pub fn counters(&self) -> &BackendCounters {
        &self.counters
    }

    /// Number of entries currently stored, expired ones included.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the raw bytes stored under `key`, ignoring expiry.
    ///
    /// Lets tests inspect what actually landed in the medium (e.g. that an
    /// encrypted payload is not plaintext) without going through the read
    /// path.
    pub fn stored_bytes(&self, key: &str) -> Option<Raw> {
        self.entries.get(key).map(|v| v.value().data().clone())
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn read(&self, key: &str) -> BackendResult<Option<CacheValue<Raw>>> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        let live = match self.entries.get(key) {
            Some(entry) if entry.value().is_expired() => {
                drop(entry);
                self.entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value().clone()),
            None => None,
        };
        if live.is_some() {
            self.counters.hits.fetch_add(1, Ordering::SeqCst);
        } else {
            self.counters.misses.fetch_add(1, Ordering::SeqCst);
        }
        Ok(live)
    }

    async fn write(&self, key: &str, value: CacheValue<Raw>) -> BackendResult<()> {
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> BackendResult<DeleteStatus> {
        self.counters.removes.fetch_add(1, Ordering::SeqCst);
        match self.entries.remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Utc;

    #[tokio::test]
    async fn read_counts_hits_and_misses() {
        let backend = MockBackend::new();

        backend
            .write("key", CacheValue::eternal(Bytes::from_static(b"v")))
            .await
            .unwrap();

        assert!(backend.read("key").await.unwrap().is_some());
        assert!(backend.read("other").await.unwrap().is_none());

        assert_eq!(backend.counters().reads(), 2);
        assert_eq!(backend.counters().hits(), 1);
        assert_eq!(backend.counters().misses(), 1);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_missing_and_is_dropped() {
        let backend = MockBackend::new();

        let expired = CacheValue::new(
            Bytes::from_static(b"v"),
            Some(Utc::now() - chrono::Duration::seconds(1)),
        );
        backend.write("key", expired).await.unwrap();
        assert_eq!(backend.entry_count(), 1);

        assert!(backend.read("key").await.unwrap().is_none());
        assert_eq!(backend.entry_count(), 0);
    }

    #[tokio::test]
    async fn remove_reports_missing() {
        let backend = MockBackend::new();
        assert_eq!(backend.remove("gone").await.unwrap(), DeleteStatus::Missing);
    }
}
