use std::sync::Arc;

use crate::cache::hot::HotCache;
use crate::codec;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Entity, EntityId, EntityKind};
use crate::index::fingerprint::{feature_fingerprint, split_features};
use crate::query::condition::SearchConditions;
use crate::query::intersect::intersect_all;
use crate::query::predicate::{ItemPredicate, ListingPredicate};
use crate::store::keys;
use crate::store::IndexStore;

/// One page of search results. `total` counts the merged id set before
/// pagination.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub total: usize,
    pub entities: Vec<Arc<Entity>>,
}

/// The index-store lookup a predicate lowers to.
enum Lookup {
    Range {
        key: String,
        min: Option<i64>,
        max: Option<i64>,
    },
    Members {
        key: String,
    },
    Intersect {
        keys: Vec<String>,
    },
}

/// Point lookup through the hot cache with fallback to the index store.
/// `Ok(None)` means no point record exists; the caller decides whether that
/// is a client NotFound or an index inconsistency.
pub(crate) fn load_point(
    store: &Arc<dyn IndexStore>,
    cache: &HotCache,
    kind: EntityKind,
    id: EntityId,
) -> Result<Option<Arc<Entity>>> {
    cache.get_or_load(kind, id, || {
        let Some(blob) = store.get_blob(&keys::point(kind, id))? else {
            return Ok(None);
        };
        let cost = blob.len();
        let entity = Arc::new(codec::decode(&blob)?);
        Ok(Some((entity, cost)))
    })
}

/// Translates a set of named filter predicates into index lookups, merges
/// the candidate id lists by intersection, orders and paginates, then
/// hydrates the surviving ids.
pub struct QueryFederator {
    store: Arc<dyn IndexStore>,
    cache: Arc<HotCache>,
    conditions: Arc<SearchConditions>,
}

impl QueryFederator {
    pub fn new(
        store: Arc<dyn IndexStore>,
        cache: Arc<HotCache>,
        conditions: Arc<SearchConditions>,
    ) -> Self {
        QueryFederator {
            store,
            cache,
            conditions,
        }
    }

    pub fn search_items(
        &self,
        predicates: &[ItemPredicate],
        page: usize,
        page_size: usize,
    ) -> Result<SearchPage> {
        let lookups = predicates
            .iter()
            .map(|p| self.lower_item(p))
            .collect::<Result<Vec<_>>>()?;
        self.run(EntityKind::Item, lookups, page, page_size)
    }

    pub fn search_listings(
        &self,
        predicates: &[ListingPredicate],
        page: usize,
        page_size: usize,
    ) -> Result<SearchPage> {
        let lookups = predicates
            .iter()
            .map(|p| self.lower_listing(p))
            .collect::<Result<Vec<_>>>()?;
        self.run(EntityKind::Listing, lookups, page, page_size)
    }

    /// Direct point lookup; absence is a client error.
    pub fn item(&self, id: EntityId) -> Result<Arc<Entity>> {
        self.fetch(EntityKind::Item, id)
    }

    pub fn listing(&self, id: EntityId) -> Result<Arc<Entity>> {
        self.fetch(EntityKind::Listing, id)
    }

    /// The `limit` cheapest items still in the price index (exhausted items
    /// have been removed from it and never show up).
    pub fn low_priced_items(&self, limit: usize) -> Result<Vec<Arc<Entity>>> {
        self.head(EntityKind::Item, "price", limit)
    }

    pub fn low_priced_listings(&self, limit: usize) -> Result<Vec<Arc<Entity>>> {
        self.head(EntityKind::Listing, "rent", limit)
    }

    fn lower_item(&self, predicate: &ItemPredicate) -> Result<Lookup> {
        let conditions = &self.conditions.item;
        let kind = EntityKind::Item;
        let lookup = match predicate {
            ItemPredicate::PriceRange(range_id) => {
                range_lookup(kind, "price", conditions.price.resolve(*range_id)?)
            }
            ItemPredicate::HeightRange(range_id) => {
                range_lookup(kind, "height", conditions.height.resolve(*range_id)?)
            }
            ItemPredicate::WidthRange(range_id) => {
                range_lookup(kind, "width", conditions.width.resolve(*range_id)?)
            }
            ItemPredicate::DepthRange(range_id) => {
                range_lookup(kind, "depth", conditions.depth.resolve(*range_id)?)
            }
            ItemPredicate::Color(value) => Lookup::Members {
                key: keys::set(kind, "color", value),
            },
            ItemPredicate::Kind(value) => Lookup::Members {
                key: keys::set(kind, "kind", value),
            },
            ItemPredicate::Features(tags) => feature_lookup(kind, tags),
        };
        Ok(lookup)
    }

    fn lower_listing(&self, predicate: &ListingPredicate) -> Result<Lookup> {
        let conditions = &self.conditions.listing;
        let kind = EntityKind::Listing;
        let lookup = match predicate {
            ListingPredicate::RentRange(range_id) => {
                range_lookup(kind, "rent", conditions.rent.resolve(*range_id)?)
            }
            ListingPredicate::DoorHeightRange(range_id) => range_lookup(
                kind,
                "door_height",
                conditions.door_height.resolve(*range_id)?,
            ),
            ListingPredicate::DoorWidthRange(range_id) => range_lookup(
                kind,
                "door_width",
                conditions.door_width.resolve(*range_id)?,
            ),
            ListingPredicate::Features(tags) => feature_lookup(kind, tags),
        };
        Ok(lookup)
    }

    fn run(
        &self,
        kind: EntityKind,
        lookups: Vec<Lookup>,
        page: usize,
        page_size: usize,
    ) -> Result<SearchPage> {
        if lookups.is_empty() {
            return Err(Error::new(
                ErrorKind::NoSearchCondition,
                "search requires at least one predicate".to_string(),
            ));
        }
        if page == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "page numbers are 1-based".to_string(),
            ));
        }

        let mut candidates = Vec::with_capacity(lookups.len());
        for lookup in &lookups {
            let mut ids = self.lookup_ids(lookup)?;
            ids.sort_unstable();
            candidates.push(ids);
        }
        let merged = intersect_all(candidates);
        let ordered = self.order_by_popularity(kind, merged)?;

        let total = ordered.len();
        let start = (page - 1).saturating_mul(page_size).min(total);
        let end = page.saturating_mul(page_size).min(total);

        let mut entities = Vec::with_capacity(end - start);
        for id in &ordered[start..end] {
            entities.push(self.hydrate(kind, *id)?);
        }
        Ok(SearchPage { total, entities })
    }

    fn lookup_ids(&self, lookup: &Lookup) -> Result<Vec<EntityId>> {
        match lookup {
            Lookup::Range { key, min, max } => self.store.range_by_score(key, *min, *max),
            Lookup::Members { key } => self.store.set_members(key),
            Lookup::Intersect { keys } => self.store.set_intersect(keys),
        }
    }

    /// Descending popularity, ascending id on ties, so pagination is
    /// deterministic and reproducible.
    fn order_by_popularity(&self, kind: EntityKind, ids: Vec<EntityId>) -> Result<Vec<EntityId>> {
        if ids.is_empty() {
            return Ok(ids);
        }
        let pop_key = keys::range(kind, keys::POPULARITY);
        let scores = self.store.scores(&pop_key, &ids)?;
        let mut ranked = Vec::with_capacity(ids.len());
        for (id, score) in ids.into_iter().zip(scores) {
            let Some(score) = score else {
                return Err(Error::new(
                    ErrorKind::IndexCacheDesync,
                    format!("popularity score missing for {}:{}", kind, id),
                ));
            };
            ranked.push((id, score));
        }
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(ranked.into_iter().map(|(id, _)| id).collect())
    }

    /// Resolve an id that came out of an index. A missing point record here
    /// is an index/store inconsistency: fail the request rather than drop
    /// the row and corrupt the reported total.
    fn hydrate(&self, kind: EntityKind, id: EntityId) -> Result<Arc<Entity>> {
        load_point(&self.store, &self.cache, kind, id)?.ok_or_else(|| {
            Error::new(
                ErrorKind::IndexCacheDesync,
                format!("point record missing for indexed id {}:{}", kind, id),
            )
        })
    }

    fn fetch(&self, kind: EntityKind, id: EntityId) -> Result<Arc<Entity>> {
        load_point(&self.store, &self.cache, kind, id)?.ok_or_else(|| {
            Error::new(ErrorKind::NotFound, format!("no {} with id {}", kind, id))
        })
    }

    fn head(&self, kind: EntityKind, attr: &str, limit: usize) -> Result<Vec<Arc<Entity>>> {
        let ids = self.store.range_head(&keys::range(kind, attr), limit)?;
        let mut entities = Vec::with_capacity(ids.len());
        for id in ids {
            entities.push(self.hydrate(kind, id)?);
        }
        Ok(entities)
    }
}

fn range_lookup(kind: EntityKind, attr: &str, spec: &crate::query::condition::RangeSpec) -> Lookup {
    let (min, max) = spec.bounds();
    Lookup::Range {
        key: keys::range(kind, attr),
        min,
        max,
    }
}

fn feature_lookup(kind: EntityKind, tags: &str) -> Lookup {
    let tag_keys = split_features(tags)
        .into_iter()
        .map(|tag| keys::feature(kind, &feature_fingerprint(tag)))
        .collect();
    Lookup::Intersect { keys: tag_keys }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Item;
    use crate::index::writer::IndexWriter;
    use crate::query::condition::fixtures;
    use crate::store::memory::MemoryStore;
    use crate::store::StoreOp;

    fn item(id: i64, price: i64, color: &str, features: &str, popularity: i64) -> Item {
        Item {
            id: EntityId(id),
            name: format!("chair {}", id),
            description: String::new(),
            thumbnail: String::new(),
            price,
            height: 100,
            width: 60,
            depth: 60,
            color: color.to_string(),
            features: features.to_string(),
            kind: "office".to_string(),
            popularity,
            stock: 5,
        }
    }

    fn federator_with(rows: Vec<Item>) -> (Arc<MemoryStore>, QueryFederator) {
        let store = Arc::new(MemoryStore::new());
        let writer = IndexWriter::new(store.clone());
        let entities: Vec<Entity> = rows.into_iter().map(Entity::Item).collect();
        writer.write_batch(&entities).unwrap();
        let federator = QueryFederator::new(
            store.clone(),
            Arc::new(HotCache::new(1024 * 1024)),
            Arc::new(fixtures::conditions()),
        );
        (store, federator)
    }

    fn result_ids(page: &SearchPage) -> Vec<i64> {
        page.entities.iter().map(|e| e.id().value()).collect()
    }

    #[test]
    fn single_categorical_predicate() {
        let (_, federator) = federator_with(vec![
            item(1, 100, "red", "", 10),
            item(2, 200, "red", "", 20),
            item(3, 100, "blue", "", 30),
        ]);
        let page = federator
            .search_items(&[ItemPredicate::Color("red".to_string())], 1, 20)
            .unwrap();
        assert_eq!(page.total, 2);
        // Popularity descending
        assert_eq!(result_ids(&page), vec![2, 1]);
    }

    #[test]
    fn range_predicate_is_half_open() {
        // price in [150, +inf) over {1: 100, 2: 200} matches only 2
        let (_, federator) = federator_with(vec![
            item(1, 100, "red", "", 10),
            item(2, 200, "red", "", 20),
        ]);
        let page = federator
            .search_items(&[ItemPredicate::PriceRange(3)], 1, 20)
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(result_ids(&page), vec![2]);

        // price in [-inf, 150) matches only 1
        let page = federator
            .search_items(&[ItemPredicate::PriceRange(0)], 1, 20)
            .unwrap();
        assert_eq!(result_ids(&page), vec![1]);
    }

    #[test]
    fn predicates_merge_by_intersection() {
        let (_, federator) = federator_with(vec![
            item(1, 100, "red", "", 1),
            item(2, 200, "red", "", 2),
            item(3, 200, "blue", "", 3),
        ]);
        let page = federator
            .search_items(
                &[
                    ItemPredicate::Color("red".to_string()),
                    ItemPredicate::PriceRange(1), // [150, 300)
                ],
                1,
                20,
            )
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(result_ids(&page), vec![2]);
    }

    #[test]
    fn feature_predicate_requires_every_tag() {
        let (_, federator) = federator_with(vec![
            item(1, 100, "red", "reclining, washable", 1),
            item(2, 100, "red", "reclining", 2),
            item(3, 100, "red", "washable, reclining, headrest", 3),
        ]);
        let page = federator
            .search_items(
                &[ItemPredicate::Features("reclining, washable".to_string())],
                1,
                20,
            )
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(result_ids(&page), vec![3, 1]);
    }

    #[test]
    fn popularity_ties_break_by_ascending_id() {
        let (_, federator) = federator_with(vec![
            item(4, 100, "red", "", 7),
            item(2, 100, "red", "", 7),
            item(9, 100, "red", "", 7),
        ]);
        let page = federator
            .search_items(&[ItemPredicate::Color("red".to_string())], 1, 20)
            .unwrap();
        assert_eq!(result_ids(&page), vec![2, 4, 9]);
    }

    #[test]
    fn pagination_windows_and_total() {
        let rows: Vec<Item> = (1..=5).map(|id| item(id, 100, "red", "", id)).collect();
        let (_, federator) = federator_with(rows);
        let predicate = [ItemPredicate::Color("red".to_string())];

        let page1 = federator.search_items(&predicate, 1, 2).unwrap();
        assert_eq!(page1.total, 5);
        assert_eq!(result_ids(&page1), vec![5, 4]);

        let page3 = federator.search_items(&predicate, 3, 2).unwrap();
        assert_eq!(page3.total, 5);
        assert_eq!(result_ids(&page3), vec![1]);

        // Past the last page: empty list, unchanged total, no error
        let page9 = federator.search_items(&predicate, 9, 2).unwrap();
        assert_eq!(page9.total, 5);
        assert!(page9.entities.is_empty());
    }

    #[test]
    fn zero_predicates_are_rejected() {
        let (_, federator) = federator_with(vec![item(1, 100, "red", "", 1)]);
        let err = federator.search_items(&[], 1, 20).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoSearchCondition);
    }

    #[test]
    fn page_zero_is_rejected() {
        let (_, federator) = federator_with(vec![item(1, 100, "red", "", 1)]);
        let err = federator
            .search_items(&[ItemPredicate::Color("red".to_string())], 0, 20)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn invalid_range_id_is_rejected() {
        let (_, federator) = federator_with(vec![item(1, 100, "red", "", 1)]);
        let err = federator
            .search_items(&[ItemPredicate::PriceRange(99)], 1, 20)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRangeId);
    }

    #[test]
    fn unmatched_value_returns_empty_page() {
        let (_, federator) = federator_with(vec![item(1, 100, "red", "", 1)]);
        let page = federator
            .search_items(&[ItemPredicate::Color("green".to_string())], 1, 20)
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.entities.is_empty());
    }

    #[test]
    fn point_lookup_and_not_found() {
        let (_, federator) = federator_with(vec![item(1, 100, "red", "", 1)]);
        assert_eq!(federator.item(EntityId(1)).unwrap().id(), EntityId(1));
        let err = federator.item(EntityId(404)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn indexed_id_without_point_record_is_desync() {
        let (store, federator) = federator_with(vec![item(1, 100, "red", "", 1)]);
        // Forge an index entry with no backing record
        store
            .apply(vec![
                StoreOp::SAdd {
                    key: "item:color:red".to_string(),
                    id: EntityId(2),
                },
                StoreOp::ZAdd {
                    key: "item:popularity".to_string(),
                    id: EntityId(2),
                    score: 9,
                },
            ])
            .unwrap();
        let err = federator
            .search_items(&[ItemPredicate::Color("red".to_string())], 1, 20)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexCacheDesync);
    }

    #[test]
    fn indexed_id_without_popularity_is_desync() {
        let (store, federator) = federator_with(vec![item(1, 100, "red", "", 1)]);
        store
            .apply(vec![StoreOp::ZRem {
                key: "item:popularity".to_string(),
                id: EntityId(1),
            }])
            .unwrap();
        let err = federator
            .search_items(&[ItemPredicate::Color("red".to_string())], 1, 20)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexCacheDesync);
    }

    #[test]
    fn low_priced_orders_by_price() {
        let (_, federator) = federator_with(vec![
            item(1, 300, "red", "", 1),
            item(2, 100, "red", "", 2),
            item(3, 200, "red", "", 3),
        ]);
        let cheapest = federator.low_priced_items(2).unwrap();
        let ids: Vec<i64> = cheapest.iter().map(|e| e.id().value()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn repeated_search_hits_the_hot_cache() {
        let (_, federator) = federator_with(vec![item(1, 100, "red", "", 1)]);
        let predicate = [ItemPredicate::Color("red".to_string())];
        federator.search_items(&predicate, 1, 20).unwrap();
        federator.search_items(&predicate, 1, 20).unwrap();
        let stats = federator.cache.stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 1);
    }
}
