use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lru::LruCache;
use parking_lot::Mutex;

use crate::core::error::Result;
use crate::core::types::{Entity, EntityId, EntityKind};

struct CachedEntity {
    entity: Arc<Entity>,
    cost: usize,
}

struct Inner {
    entries: LruCache<(EntityKind, EntityId), CachedEntity>,
    used_cost: usize,
}

/// Bounded in-process cache for decoded point records, cache-aside in front
/// of the index store. The bound is an aggregate byte budget, not an entry
/// count; least-recently-used entries are evicted once the budget is
/// exceeded. Eviction is a latency concern only: any entry may be dropped
/// at any time. Point records are immutable after creation, so there is no
/// invalidation path; mutable state (stock) lives outside the cached blob.
pub struct HotCache {
    inner: Mutex<Inner>,
    max_cost: usize,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

impl HotCache {
    pub fn new(max_cost: usize) -> Self {
        HotCache {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                used_cost: 0,
            }),
            max_cost,
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    /// Cache-aside point lookup. On a miss the loader runs outside the lock
    /// (concurrent loads of the same key may race; the store is idempotent
    /// for point reads) and returns the value with its cost in bytes, or
    /// `None` when the record does not exist; absence is never cached.
    pub fn get_or_load<F>(
        &self,
        kind: EntityKind,
        id: EntityId,
        loader: F,
    ) -> Result<Option<Arc<Entity>>>
    where
        F: FnOnce() -> Result<Option<(Arc<Entity>, usize)>>,
    {
        if let Some(cached) = self.inner.lock().entries.get(&(kind, id)) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(cached.entity.clone()));
        }
        self.miss_count.fetch_add(1, Ordering::Relaxed);

        let Some((entity, cost)) = loader()? else {
            return Ok(None);
        };

        let mut inner = self.inner.lock();
        if let Some(replaced) = inner.entries.put(
            (kind, id),
            CachedEntity {
                entity: entity.clone(),
                cost,
            },
        ) {
            inner.used_cost -= replaced.cost;
        }
        inner.used_cost += cost;
        while inner.used_cost > self.max_cost {
            match inner.entries.pop_lru() {
                Some((_, evicted)) => inner.used_cost -= evicted.cost,
                None => break,
            }
        }
        Ok(Some(entity))
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            entries: inner.entries.len(),
            used_cost: inner.used_cost,
            max_cost: self.max_cost,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub entries: usize,
    pub used_cost: usize,
    pub max_cost: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}
