use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::trace;

/// Default lifetime of a cached namespace, in minutes.
pub const DEFAULT_CACHE_MINUTES: i64 = 60;

/// How often expired entries are swept out on access.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

struct CacheInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    next_sweep: Instant,
}

/// Time-expiring map from namespace to value.
///
/// Expiration is absolute: an entry lives for `ttl` from insertion no matter
/// how often it is read. A `ttl` of `None` keeps entries forever.
pub struct NamespaceCache<V> {
    ttl: Option<Duration>,
    cleanup_interval: Duration,
    inner: Mutex<CacheInner<V>>,
}

impl<V: Clone> NamespaceCache<V> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self::with_cleanup_interval(ttl, CLEANUP_INTERVAL)
    }

    pub fn with_cleanup_interval(ttl: Option<Duration>, cleanup_interval: Duration) -> Self {
        Self {
            ttl,
            cleanup_interval,
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                next_sweep: Instant::now() + cleanup_interval,
            }),
        }
    }

    /// Cache whose entries live `minutes` minutes; zero or less never expires.
    ///
    /// A lifetime too large to represent also never expires.
    pub fn from_minutes(minutes: i64) -> Self {
        let ttl = u64::try_from(minutes)
            .ok()
            .filter(|m| *m > 0)
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs);
        Self::new(ttl)
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Look up a live entry.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.lock();
        self.maybe_sweep(&mut inner, now);

        match inner.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                inner.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace an entry with a fresh expiration.
    pub fn insert(&self, key: &str, value: V) {
        let now = Instant::now();
        let mut inner = self.lock();
        self.maybe_sweep(&mut inner, now);
        inner.entries.insert(key.to_string(), self.entry(value, now));
    }

    /// Return the live entry for `key`, building and inserting it on a miss.
    pub fn get_or_insert_with<F>(&self, key: &str, build: F) -> V
    where
        F: FnOnce() -> V,
    {
        let now = Instant::now();
        let mut inner = self.lock();
        self.maybe_sweep(&mut inner, now);

        if let Some(entry) = inner.entries.get(key) {
            if !entry.is_expired(now) {
                return entry.value.clone();
            }
        }

        trace!(namespace = key, "namespace cache miss");
        let value = build();
        inner
            .entries
            .insert(key.to_string(), self.entry(value.clone(), now));
        value
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .lock()
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Drop every entry.
    pub fn flush(&self) {
        self.lock().entries.clear();
    }

    /// Drop expired entries now, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        Self::sweep(&mut inner, now)
    }

    fn entry(&self, value: V, now: Instant) -> CacheEntry<V> {
        CacheEntry {
            value,
            // Past the end of the clock means never.
            expires_at: self.ttl.and_then(|ttl| now.checked_add(ttl)),
        }
    }

    fn maybe_sweep(&self, inner: &mut CacheInner<V>, now: Instant) {
        if now >= inner.next_sweep {
            Self::sweep(inner, now);
            inner.next_sweep = now + self.cleanup_interval;
        }
    }

    fn sweep(inner: &mut CacheInner<V>, now: Instant) -> usize {
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - inner.entries.len();
        if removed > 0 {
            trace!(removed, "swept expired namespaces");
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for NamespaceCache<V> {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_CACHE_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_or_insert_builds_once() {
        let cache = NamespaceCache::<u32>::default();
        let mut builds = 0;

        let first = cache.get_or_insert_with("foo", || {
            builds += 1;
            1
        });
        let second = cache.get_or_insert_with("foo", || {
            builds += 1;
            2
        });

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entries_expire() {
        let cache = NamespaceCache::new(Some(Duration::from_millis(20)));
        cache.insert("foo", 1);
        assert_eq!(cache.get("foo"), Some(1));

        thread::sleep(Duration::from_millis(40));

        assert_eq!(cache.get("foo"), None);
        assert_eq!(cache.get_or_insert_with("foo", || 2), 2);
    }

    #[test]
    fn test_expired_entries_are_not_counted() {
        let cache = NamespaceCache::new(Some(Duration::from_millis(20)));
        cache.insert("a", 1);
        cache.insert("b", 2);
        thread::sleep(Duration::from_millis(40));
        cache.insert("c", 3);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.keys(), vec!["c".to_string()]);
        assert_eq!(cache.purge_expired(), 2);
    }

    #[test]
    fn test_periodic_sweep_on_access() {
        let cache = NamespaceCache::with_cleanup_interval(
            Some(Duration::from_millis(10)),
            Duration::from_millis(10),
        );
        cache.insert("old", 1);
        thread::sleep(Duration::from_millis(30));

        // Touching any key sweeps, so nothing expired is left to purge.
        assert_eq!(cache.get("other"), None);
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_non_positive_minutes_never_expire() {
        assert_eq!(NamespaceCache::<u8>::from_minutes(0).ttl(), None);
        assert_eq!(NamespaceCache::<u8>::from_minutes(-5).ttl(), None);
        assert_eq!(
            NamespaceCache::<u8>::from_minutes(2).ttl(),
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn test_huge_lifetimes_never_expire() {
        assert_eq!(NamespaceCache::<u8>::from_minutes(i64::MAX).ttl(), None);
        assert!(NamespaceCache::<u8>::from_minutes(153_722_867_280_912_930)
            .ttl()
            .is_some());

        for cache in [
            NamespaceCache::from_minutes(153_722_867_280_912_930),
            NamespaceCache::new(Some(Duration::MAX)),
        ] {
            assert_eq!(cache.get_or_insert_with("x", || 1), 1);
            assert_eq!(cache.get("x"), Some(1));
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.purge_expired(), 0);
        }
    }

    #[test]
    fn test_flush() {
        let cache = NamespaceCache::default();
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.flush();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_insert_same_key() {
        let cache = Arc::new(NamespaceCache::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..100 {
                        cache.get_or_insert_with("shared", || i);
                        cache.insert(&format!("own:{}", i), i);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 9);
    }
}
