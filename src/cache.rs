//! Bounded least-recently-used cache shared by the filter engine.
//!
//! Wraps [`lru::LruCache`] (a linked-list backed LRU) behind a single mutex so the
//! map and its access order can never drift apart, and so eviction accounting stays
//! correct when the owning engine is shared across threads.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

/// Default number of entries kept by filter result caches.
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

/// Bounded cache with least-recently-used eviction.
///
/// `get` refreshes an entry's recency; `put` into a full cache evicts exactly one
/// entry, the least recently accessed.
#[derive(Debug)]
pub struct BoundedCache<K: Hash + Eq, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries. A capacity of zero is
    /// treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    // Cached values are derived data, so a panic while holding the lock leaves
    // nothing that cannot be recomputed.
    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Look up an entry, marking it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Insert an entry. Returns the evicted `(key, value)` if the cache was full.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        let mut cache = self.lock();
        if cache.contains(&key) {
            cache.put(key, value);
            None
        } else {
            cache.push(key, value)
        }
    }

    /// Whether the key is cached. Does not affect recency.
    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains(key)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
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
}

impl<K: Hash + Eq, V: Clone> Default for BoundedCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = BoundedCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);

        // Touch "a" so "b" becomes the eviction candidate
        check!(cache.get(&"a") == Some(1));

        let_assert!(Some((evicted, _)) = cache.put("c", 3));
        check!(evicted == "b");
        check!(cache.contains(&"a"));
        check!(cache.contains(&"c"));
        check!(cache.len() == 2);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = BoundedCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        check!(cache.put("a", 10).is_none());
        check!(cache.get(&"a") == Some(10));
        check!(cache.len() == 2);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let cache = BoundedCache::new(3);
        for i in 0..100 {
            cache.put(i, i);
        }
        check!(cache.len() == 3);
        check!(cache.contains(&99));
        check!(!cache.contains(&0));
    }

    #[test]
    fn test_clear() {
        let cache = BoundedCache::new(4);
        cache.put(1, "x");
        cache.clear();
        check!(cache.is_empty());
        check!(cache.get(&1).is_none());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache: BoundedCache<u8, u8> = BoundedCache::new(0);
        check!(cache.capacity() == 1);
    }
}
