//! Cached value wrapper with expiration metadata.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A cached payload together with the instant it stops being readable.
///
/// `expire` of `None` means the entry never expires. Backends either delegate
/// the deadline to the medium's native expiry or persist the absolute instant
/// and filter on read; either way an expired entry must behave exactly like a
/// missing one.
///
/// # Example
///
/// ```
/// use remcache_core::CacheValue;
/// use chrono::Utc;
///
/// let value = CacheValue::new("user_data", Some(Utc::now() + chrono::Duration::hours(1)));
/// assert_eq!(value.data(), &"user_data");
/// assert!(!value.is_expired());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheValue<T> {
    data: T,
    expire: Option<DateTime<Utc>>,
}

impl<T> CacheValue<T> {
    /// Creates a new cache value with the given payload and expiration instant.
    pub fn new(data: T, expire: Option<DateTime<Utc>>) -> Self {
        CacheValue { data, expire }
    }

    /// Creates a value that never expires.
    pub fn eternal(data: T) -> Self {
        CacheValue { data, expire: None }
    }

    /// Returns a reference to the cached payload.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns the instant after which the entry must read as missing.
    #[inline]
    pub fn expire(&self) -> Option<DateTime<Utc>> {
        self.expire
    }

    /// Consumes the value and returns the inner payload, discarding metadata.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Whether the expiration instant has passed as of now.
    pub fn is_expired(&self) -> bool {
        match self.expire {
            Some(expire) => expire <= Utc::now(),
            None => false,
        }
    }

    /// Remaining time-to-live derived from the expire instant.
    ///
    /// Returns `None` for eternal entries and for entries that already
    /// expired. Sub-millisecond remainders round down.
    pub fn ttl(&self) -> Option<Duration> {
        let expire = self.expire?;
        let remaining = expire.signed_duration_since(Utc::now());
        if remaining.num_milliseconds() > 0 {
            Some(Duration::from_millis(remaining.num_milliseconds() as u64))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eternal_value_never_expires() {
        let value = CacheValue::eternal(b"data".to_vec());
        assert!(!value.is_expired());
        assert_eq!(value.ttl(), None);
        assert_eq!(value.expire(), None);
    }

    #[test]
    fn future_expire_reports_remaining_ttl() {
        let value = CacheValue::new((), Some(Utc::now() + chrono::Duration::hours(1)));
        assert!(!value.is_expired());
        let ttl = value.ttl().unwrap();
        assert!(ttl <= Duration::from_secs(3600));
        assert!(ttl > Duration::from_secs(3590));
    }

    #[test]
    fn past_expire_reads_as_expired() {
        let value = CacheValue::new((), Some(Utc::now() - chrono::Duration::seconds(1)));
        assert!(value.is_expired());
        assert_eq!(value.ttl(), None);
    }
}
