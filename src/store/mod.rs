pub mod keys;
pub mod memory;

use bytes::Bytes;

use crate::core::error::Result;
use crate::core::types::EntityId;

/// One mutation inside an atomically-applied group.
#[derive(Debug, Clone)]
pub enum StoreOp {
    /// Write a point-record blob.
    SetBlob { key: String, value: Bytes },
    /// Insert or update a member of a range index with the given score.
    ZAdd { key: String, id: EntityId, score: i64 },
    /// Remove a member from a range index.
    ZRem { key: String, id: EntityId },
    /// Insert a member into a set index.
    SAdd { key: String, id: EntityId },
    /// Remove a member from a set index.
    SRem { key: String, id: EntityId },
    /// Initialize or overwrite a scalar counter.
    SetCounter { key: String, value: i64 },
}

/// The external key-value / sorted-set store holding the derived indexes.
///
/// Three primitive shapes: blobs (point records), score-ordered member sets
/// (range indexes), unordered member sets (categorical/tag indexes), plus
/// scalar counters. `apply` is the only write path for index state and is
/// atomic: readers observe either none or all of a group. Components take
/// `Arc<dyn IndexStore>` so tests can substitute fakes.
pub trait IndexStore: Send + Sync {
    fn get_blob(&self, key: &str) -> Result<Option<Bytes>>;

    /// Ids whose score lies in `[min, max)`; a `None` bound is unbounded.
    fn range_by_score(
        &self,
        key: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Vec<EntityId>>;

    /// Up to `limit` ids with the lowest scores, in ascending score order.
    fn range_head(&self, key: &str, limit: usize) -> Result<Vec<EntityId>>;

    fn set_members(&self, key: &str) -> Result<Vec<EntityId>>;

    /// Ids present in every one of the given sets.
    fn set_intersect(&self, keys: &[String]) -> Result<Vec<EntityId>>;

    /// Per-id score lookup against one range index; `None` for absent members.
    fn scores(&self, key: &str, ids: &[EntityId]) -> Result<Vec<Option<i64>>>;

    fn get_counter(&self, key: &str) -> Result<Option<i64>>;

    /// Conditional atomic decrement. `Err(NotFound)` if the counter does not
    /// exist, `Ok(None)` if its value is already <= 0 (nothing decremented),
    /// otherwise `Ok(Some(new_value))`. Of any number of concurrent callers
    /// racing a counter at 1, exactly one observes `Some(0)`.
    fn decr_counter(&self, key: &str) -> Result<Option<i64>>;

    /// Apply a group of mutations atomically. Partial application must never
    /// be observable.
    fn apply(&self, ops: Vec<StoreOp>) -> Result<()>;
}
