//! FILENAME: core/perimeter-engine/src/cache.rs
//! Sub-Level Cache - memoized filtered row sets, keyed by (level, filters).
//!
//! Entries live until `clear()`. Each key owns a `OnceCell` slot, so
//! concurrent misses on the same key compute once and the other callers
//! wait for that result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::definition::{FilterSet, PerimeterItem};
use crate::level::PerimeterLevel;
use crate::{log_debug, log_info};

/// Cache key: a level and its canonical filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub level: PerimeterLevel,
    pub filters: FilterSet,
}

impl CacheKey {
    /// The filters are canonicalized, so insertion order and "all" entries
    /// never produce distinct keys.
    pub fn new(level: PerimeterLevel, filters: &FilterSet) -> Self {
        CacheKey {
            level,
            filters: filters.canonical(),
        }
    }
}

type Slot = Arc<OnceCell<Arc<Vec<PerimeterItem>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub computations: u64,
}

#[derive(Debug, Default)]
pub struct SubLevelCache {
    slots: RwLock<FxHashMap<CacheKey, Slot>>,
    hits: AtomicU64,
    computations: AtomicU64,
}

impl SubLevelCache {
    pub fn new() -> Self {
        SubLevelCache::default()
    }

    /// Returns the cached rows for `key`, computing them on the first request.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Arc<Vec<PerimeterItem>>
    where
        F: FnOnce() -> Vec<PerimeterItem>,
    {
        let existing = {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            slots.get(&key).cloned()
        };

        let slot = match existing {
            Some(slot) => slot,
            None => {
                let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
                slots.entry(key.clone()).or_default().clone()
            }
        };

        let mut computed = false;
        let rows = slot
            .get_or_init(|| {
                computed = true;
                Arc::new(compute())
            })
            .clone();

        if computed {
            self.computations.fetch_add(1, Ordering::Relaxed);
            log_debug!(
                "CACHE",
                "MISS {} ({} filters) -> {} rows",
                key.level,
                key.filters.active_count(),
                rows.len()
            );
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        rows
    }

    /// Rows already computed for `key`, without computing.
    pub fn peek(&self, key: &CacheKey) -> Option<Arc<Vec<PerimeterItem>>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    pub fn clear(&self) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = slots.len();
        slots.clear();
        log_info!("CACHE", "cleared {} entries", dropped);
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::FilterKey;
    use std::sync::atomic::AtomicUsize;

    fn key(filters: &FilterSet) -> CacheKey {
        CacheKey::new(PerimeterLevel::Category, filters)
    }

    #[test]
    fn second_request_is_a_hit() {
        let cache = SubLevelCache::new();
        let calls = AtomicUsize::new(0);
        let filters = FilterSet::new().with(FilterKey::Marche, "MKT-01");

        for _ in 0..3 {
            let rows = cache.get_or_compute(key(&filters), || {
                calls.fetch_add(1, Ordering::SeqCst);
                Vec::new()
            });
            assert!(rows.is_empty());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 2,
                computations: 1
            }
        );
    }

    #[test]
    fn key_ignores_order_and_sentinels() {
        let a = FilterSet::new()
            .with(FilterKey::Marche, "MKT-01")
            .with(FilterKey::Pays, "CTY-01");
        let b = FilterSet::new()
            .with(FilterKey::Pays, "CTY-01")
            .with(FilterKey::Famille, "all")
            .with(FilterKey::Marche, "MKT-01");
        assert_eq!(key(&a), key(&b));
        assert_ne!(key(&a), CacheKey::new(PerimeterLevel::Product, &a));
    }

    #[test]
    fn clear_drops_entries() {
        let cache = SubLevelCache::new();
        cache.get_or_compute(key(&FilterSet::new()), Vec::new);
        assert!(cache.peek(&key(&FilterSet::new())).is_some());

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.peek(&key(&FilterSet::new())).is_none());
    }

    #[test]
    fn concurrent_misses_compute_once() {
        let cache = SubLevelCache::new();
        let calls = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache.get_or_compute(key(&FilterSet::new()), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(20));
                        Vec::new()
                    });
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.computations, 1);
        assert_eq!(stats.hits, 7);
    }
}
