//! In-memory LRU cache of fetched bodies with lazy TTL expiry

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;

/// Source of the current time, in epoch seconds
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_seconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A cached body and when it was fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub fetched_at: i64,
    pub body: String,
}

/// Outcome of a cache read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(String),
    /// Was present but older than the TTL; it has been evicted
    Expired,
    Miss,
}

/// Capacity-bounded LRU from resolved URI to body.
///
/// All reads and writes go through one mutex; it is never held across an
/// await point.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl_seconds: i64,
}

impl ResponseCache {
    pub fn new(capacity: NonZeroUsize, ttl_seconds: i64) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Read `key`, evicting it if it has outlived the TTL.
    ///
    /// A non-positive TTL makes every read a miss.
    pub fn lookup(&self, key: &str, now: i64) -> CacheLookup {
        let mut entries = self.lock();

        match entries.get(key) {
            None => return CacheLookup::Miss,
            Some(entry) if !self.is_expired(entry, now) => {
                return CacheLookup::Hit(entry.body.clone());
            }
            Some(_) => {}
        }

        entries.pop(key);
        CacheLookup::Expired
    }

    /// Insert or replace, evicting the least recently used entry when full
    pub fn insert(&self, key: impl Into<String>, entry: CacheEntry) {
        self.lock().put(key.into(), entry);
    }

    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        self.lock().pop(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn is_expired(&self, entry: &CacheEntry, now: i64) -> bool {
        self.ttl_seconds <= 0 || now - entry.fetched_at > self.ttl_seconds
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize, ttl: i64) -> ResponseCache {
        ResponseCache::new(NonZeroUsize::new(capacity).unwrap(), ttl)
    }

    fn entry(at: i64, body: &str) -> CacheEntry {
        CacheEntry {
            fetched_at: at,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = cache(4, 60);
        cache.insert("http://a", entry(100, "{}"));

        assert_eq!(cache.lookup("http://a", 100), CacheLookup::Hit("{}".into()));
        assert_eq!(cache.lookup("http://a", 160), CacheLookup::Hit("{}".into()));
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = cache(4, 60);
        cache.insert("http://a", entry(100, "{}"));

        assert_eq!(cache.lookup("http://a", 161), CacheLookup::Expired);
        assert!(!cache.contains("http://a"));
        assert_eq!(cache.lookup("http://a", 161), CacheLookup::Miss);
    }

    #[test]
    fn test_zero_ttl_always_misses() {
        let cache = cache(4, 0);
        cache.insert("http://a", entry(100, "{}"));
        assert_eq!(cache.lookup("http://a", 100), CacheLookup::Expired);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = cache(2, 60);
        cache.insert("http://a", entry(0, "a"));
        cache.insert("http://b", entry(0, "b"));

        // Touch a so b becomes least recently used
        assert!(matches!(cache.lookup("http://a", 0), CacheLookup::Hit(_)));
        cache.insert("http://c", entry(0, "c"));

        assert!(cache.contains("http://a"));
        assert!(!cache.contains("http://b"));
        assert!(cache.contains("http://c"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_clear_and_remove() {
        let cache = cache(4, 60);
        cache.insert("http://a", entry(0, "a"));
        cache.insert("http://b", entry(0, "b"));

        assert_eq!(cache.remove("http://a").map(|e| e.body), Some("a".to_string()));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now_epoch_seconds(), 15);
        clock.set(1);
        assert_eq!(clock.now_epoch_seconds(), 1);
    }
}
