//! Bounded least-recently-used cache with single evaluation per key.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use indexmap::IndexMap;

/// Hit and miss counts of a [`BoundedCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Times the value function actually ran
    pub evaluations: u64,
    pub len: usize,
}

/// Thread-safe memo table holding at most `capacity` entries.
///
/// Entries live in an [`IndexMap`] ordered from least to most recently
/// used. Each slot is an `Arc<OnceLock<V>>`, so the map lock is released
/// before the value is computed and concurrent misses on the same key wait
/// for a single evaluation. Evicting a slot that another thread is still
/// filling is harmless: that thread keeps its `Arc`.
pub struct BoundedCache<K, V> {
    capacity: usize,
    entries: Mutex<IndexMap<K, Arc<OnceLock<V>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evaluations: AtomicU64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    /// A cache with room for `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(IndexMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evaluations: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<K, Arc<OnceLock<V>>>> {
        // Values are written through OnceLock, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached value for `key`, computing it with `f` on a miss.
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        F: FnOnce() -> V,
    {
        let slot = {
            let mut map = self.lock();
            if let Some(index) = map.get_index_of(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let last = map.len() - 1;
                map.move_index(index, last);
                Arc::clone(&map[last])
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let slot = Arc::new(OnceLock::new());
                map.insert(key, Arc::clone(&slot));
                while map.len() > self.capacity {
                    map.shift_remove_index(0);
                }
                slot
            }
        };

        slot.get_or_init(|| {
            self.evaluations.fetch_add(1, Ordering::Relaxed);
            f()
        })
        .clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evaluations: self.evaluations.load(Ordering::Relaxed),
            len: self.len(),
        }
    }
}

impl<K, V> std::fmt::Debug for BoundedCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish()
    }
}
