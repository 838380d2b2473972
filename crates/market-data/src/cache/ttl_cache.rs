//! Generic in-memory key/value store with per-entry time-to-live.
//!
//! Expiry is lazy: an entry is only removed when a `get` observes it past its
//! deadline, or through `delete`/`clear`. There is no background sweep and no
//! capacity bound.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::warn;
use tokio::time::Instant;

/// TTL applied by [`TtlCache::set`] when none is given.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Roughly thirty years; used when `now + ttl` would overflow.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe TTL map.
///
/// Uses tokio's clock so tests can pause and advance time.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Lock the entry map, recovering from poison.
    ///
    /// No operation leaves the map half-updated, so a poisoned guard is still
    /// consistent.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Store `value` under `key` with the default TTL. Overwrites any
    /// existing entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store `value` under `key`, expiring `ttl` from now. Last write wins.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);

        self.lock_entries()
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Return the stored value if it has not expired.
    ///
    /// An expired entry is removed on the spot, so "never set" and "expired"
    /// look the same to the caller.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock_entries();

        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Remove `key`. Returns whether an entry (live or expired) was present.
    pub fn delete(&self, key: &str) -> bool {
        self.lock_entries().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Number of stored entries, including expired ones nobody has read yet.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test(start_paused = true)]
    async fn test_set_then_get_returns_value() {
        let cache = TtlCache::new();
        cache.set_with_ttl("stock:AAPL", 42u32, Duration::from_secs(10));
        assert_eq!(cache.get("stock:AAPL"), Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_absent_and_removed() {
        let cache = TtlCache::new();
        cache.set_with_ttl("k", "v".to_string(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
        // Not resurrected by a second read
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_exactly_at_deadline() {
        let cache = TtlCache::new();
        cache.set_with_ttl("k", 1u8, Duration::from_secs(5));

        tokio::time::advance(Duration::from_millis(4_999)).await;
        assert_eq!(cache.get("k"), Some(1));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_uses_default_ttl() {
        let cache = TtlCache::with_default_ttl(Duration::from_secs(2));
        cache.set("k", 7i64);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k"), Some(7));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let cache = TtlCache::new();
        cache.set("k", 1);
        cache.set("k", 2);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = TtlCache::new();
        cache.set("a", 1);
        cache.set("b", 2);

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_zero_ttl_is_never_readable() {
        let cache = TtlCache::new();
        cache.set_with_ttl("k", 1, Duration::ZERO);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let cache = TtlCache::new();
        cache.set_with_ttl("k", 1, Duration::MAX);
        assert_eq!(cache.get("k"), Some(1));
    }

    proptest! {
        #[test]
        fn prop_set_then_get_roundtrips(key in "[a-z]{1,8}:[A-Z]{1,5}", value in any::<i64>(), ttl_secs in 1u64..1_000_000) {
            let cache = TtlCache::new();
            cache.set_with_ttl(key.clone(), value, Duration::from_secs(ttl_secs));
            prop_assert_eq!(cache.get(&key), Some(value));
        }

        #[test]
        fn prop_delete_then_get_is_absent(key in "[a-z]{1,12}", ttl_secs in 0u64..1_000_000) {
            let cache = TtlCache::new();
            cache.set_with_ttl(key.clone(), 1u8, Duration::from_secs(ttl_secs));
            cache.delete(&key);
            prop_assert_eq!(cache.get(&key), None);
        }
    }
}
