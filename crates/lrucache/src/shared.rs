//! SharedLruCache: one lock around an LruCache
//!
//! Detach and reinsert are not atomic with respect to each other, so every
//! call takes the whole cache under a single mutex.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::lru::LruCache;
use crate::snapshot::Snapshot;
use crate::stats::StatsSnapshot;

/// Cloneable handle to an [`LruCache`] shared across threads
#[derive(Debug, Clone)]
pub struct SharedLruCache {
    inner: Arc<Mutex<LruCache>>,

    /// Cache capacity, fixed at construction
    capacity: usize,
}

impl SharedLruCache {
    /// Create a new shared cache with the given capacity
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries
    ///
    /// # Returns
    /// * `Result<SharedLruCache>` - Fails if `capacity <= 0`
    pub fn new(capacity: i64) -> Result<Self> {
        Self::with_config(CacheConfig::with_capacity(capacity))
    }

    /// Create a new shared cache from a [`CacheConfig`]
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        let cache = LruCache::with_config(config)?;
        Ok(Self::from_cache(cache))
    }

    /// Wrap an existing cache
    pub fn from_cache(cache: LruCache) -> Self {
        let capacity = cache.capacity();
        Self {
            inner: Arc::new(Mutex::new(cache)),
            capacity,
        }
    }

    /// Get a value, returning [`NOT_FOUND`](crate::NOT_FOUND) on a miss
    pub fn get(&self, key: i64) -> i64 {
        self.inner.lock().get(key)
    }

    /// Get a value, returning `None` on a miss
    pub fn lookup(&self, key: i64) -> Option<i64> {
        self.inner.lock().lookup(key)
    }

    /// Insert or overwrite a key
    pub fn put(&self, key: i64, value: i64) {
        self.inner.lock().put(key, value);
    }

    /// Copy out the cache state
    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().snapshot()
    }

    /// Copy out the cache counters
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.inner.lock().stats().snapshot()
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Run `f` with exclusive access to the cache
    ///
    /// Use this to make a read-then-write sequence atomic.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LruCache) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NOT_FOUND;
    use std::thread;

    #[test]
    fn test_shared_basic() {
        let cache = SharedLruCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(1), 1);

        cache.put(3, 3);
        assert_eq!(cache.get(2), NOT_FOUND);
        assert_eq!(cache.snapshot().order, vec![3, 1]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_shared_rejects_zero_capacity() {
        assert!(SharedLruCache::new(0).is_err());
    }

    #[test]
    fn test_shared_clone_sees_same_cache() {
        let cache = SharedLruCache::new(4).unwrap();
        let other = cache.clone();

        other.put(5, 50);
        assert_eq!(cache.lookup(5), Some(50));
        assert_eq!(cache.stats_snapshot().hits, 1);
    }

    #[test]
    fn test_shared_concurrent_puts() {
        let cache = SharedLruCache::new(16).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..1000 {
                        let key = t * 1000 + i;
                        cache.put(key, key);
                        cache.get(key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 16);
        cache.with_lock(|inner| inner.check_invariants()).unwrap();

        let stats = cache.stats_snapshot();
        assert_eq!(stats.inserts, 8000);
        assert_eq!(stats.evictions, 8000 - 16);
    }
}
