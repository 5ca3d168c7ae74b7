use std::collections::{HashMap, HashSet};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::EntityId;
use crate::store::{IndexStore, StoreOp};

#[derive(Default)]
struct Inner {
    blobs: HashMap<String, Bytes>,
    zsets: HashMap<String, HashMap<EntityId, i64>>,
    sets: HashMap<String, HashSet<EntityId>>,
    counters: HashMap<String, i64>,
}

/// In-process implementation of the index store. A single `RwLock` is the
/// transaction primitive: `apply` and `decr_counter` take the write lock, so
/// readers observe either none or all of a group.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_range(score: i64, min: Option<i64>, max: Option<i64>) -> bool {
    if let Some(min) = min {
        if score < min {
            return false;
        }
    }
    if let Some(max) = max {
        if score >= max {
            return false;
        }
    }
    true
}

impl IndexStore for MemoryStore {
    fn get_blob(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.inner.read().blobs.get(key).cloned())
    }

    fn range_by_score(
        &self,
        key: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Vec<EntityId>> {
        let inner = self.inner.read();
        let Some(members) = inner.zsets.get(key) else {
            return Ok(Vec::new());
        };
        let mut hits: Vec<(i64, EntityId)> = members
            .iter()
            .filter(|(_, score)| in_range(**score, min, max))
            .map(|(id, score)| (*score, *id))
            .collect();
        hits.sort_unstable();
        Ok(hits.into_iter().map(|(_, id)| id).collect())
    }

    fn range_head(&self, key: &str, limit: usize) -> Result<Vec<EntityId>> {
        let mut ids = self.range_by_score(key, None, None)?;
        ids.truncate(limit);
        Ok(ids)
    }

    fn set_members(&self, key: &str) -> Result<Vec<EntityId>> {
        let inner = self.inner.read();
        let mut ids: Vec<EntityId> = inner
            .sets
            .get(key)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        Ok(ids)
    }

    fn set_intersect(&self, keys: &[String]) -> Result<Vec<EntityId>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let inner = self.inner.read();
        let mut sets = Vec::with_capacity(keys.len());
        for key in keys {
            match inner.sets.get(key) {
                Some(members) => sets.push(members),
                None => return Ok(Vec::new()),
            }
        }
        // Probe from the smallest set
        sets.sort_by_key(|members| members.len());
        let mut sets = sets.into_iter();
        let Some(first) = sets.next() else {
            return Ok(Vec::new());
        };
        let rest: Vec<_> = sets.collect();
        let mut ids: Vec<EntityId> = first
            .iter()
            .filter(|id| rest.iter().all(|members| members.contains(*id)))
            .copied()
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn scores(&self, key: &str, ids: &[EntityId]) -> Result<Vec<Option<i64>>> {
        let inner = self.inner.read();
        let members = inner.zsets.get(key);
        Ok(ids
            .iter()
            .map(|id| members.and_then(|m| m.get(id).copied()))
            .collect())
    }

    fn get_counter(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.inner.read().counters.get(key).copied())
    }

    fn decr_counter(&self, key: &str) -> Result<Option<i64>> {
        let mut inner = self.inner.write();
        match inner.counters.get_mut(key) {
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("counter {} does not exist", key),
            )),
            Some(value) if *value <= 0 => Ok(None),
            Some(value) => {
                *value -= 1;
                Ok(Some(*value))
            }
        }
    }

    fn apply(&self, ops: Vec<StoreOp>) -> Result<()> {
        let mut inner = self.inner.write();
        for op in ops {
            match op {
                StoreOp::SetBlob { key, value } => {
                    inner.blobs.insert(key, value);
                }
                StoreOp::ZAdd { key, id, score } => {
                    inner.zsets.entry(key).or_default().insert(id, score);
                }
                StoreOp::ZRem { key, id } => {
                    if let Some(members) = inner.zsets.get_mut(&key) {
                        members.remove(&id);
                    }
                }
                StoreOp::SAdd { key, id } => {
                    inner.sets.entry(key).or_default().insert(id);
                }
                StoreOp::SRem { key, id } => {
                    if let Some(members) = inner.sets.get_mut(&key) {
                        members.remove(&id);
                    }
                }
                StoreOp::SetCounter { key, value } => {
                    inner.counters.insert(key, value);
                }
            }
        }
        Ok(())
    }
}
