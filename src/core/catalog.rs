use std::sync::Arc;

use crate::cache::hot::{CacheStats, HotCache};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::{Entity, EntityId, Item, Listing};
use crate::index::writer::IndexWriter;
use crate::query::condition::SearchConditions;
use crate::query::federator::{QueryFederator, SearchPage};
use crate::query::predicate::{ItemPredicate, ListingPredicate};
use crate::relay::{PersistTask, PersistenceRelay, RelationalStore};
use crate::stock::coordinator::PurchaseCoordinator;
use crate::store::IndexStore;

/// Process-wide context wiring the components together. Built once at
/// startup and shared by handle; nothing reaches ambient global state, so
/// tests can substitute a fake index store or relational store.
pub struct Catalog {
    conditions: Arc<SearchConditions>,
    cache: Arc<HotCache>,
    writer: IndexWriter,
    federator: QueryFederator,
    coordinator: PurchaseCoordinator,
    relay: Arc<PersistenceRelay>,
}

impl Catalog {
    pub fn open(
        config: Config,
        conditions: SearchConditions,
        store: Arc<dyn IndexStore>,
        relational: Arc<dyn RelationalStore>,
    ) -> Self {
        let conditions = Arc::new(conditions);
        let cache = Arc::new(HotCache::new(config.cache_max_cost));
        let relay = Arc::new(PersistenceRelay::spawn(relational, config.relay_queue));

        let writer = IndexWriter::new(store.clone());
        let federator = QueryFederator::new(store.clone(), cache.clone(), conditions.clone());
        let coordinator = PurchaseCoordinator::new(store, cache.clone(), relay.clone());

        Catalog {
            conditions,
            cache,
            writer,
            federator,
            coordinator,
            relay,
        }
    }

    /// Bulk-load item rows: the index batch is applied synchronously (the
    /// request is only acknowledged once it lands), the relational mirror
    /// runs behind the relay. A failed batch is rejected wholesale and
    /// never reaches the relay.
    pub fn load_items(&self, rows: Vec<Item>) -> Result<()> {
        let entities: Vec<Entity> = rows.iter().cloned().map(Entity::Item).collect();
        self.writer.write_batch(&entities)?;
        self.relay.enqueue(PersistTask::UpsertItems(rows));
        Ok(())
    }

    pub fn load_listings(&self, rows: Vec<Listing>) -> Result<()> {
        let entities: Vec<Entity> = rows.iter().cloned().map(Entity::Listing).collect();
        self.writer.write_batch(&entities)?;
        self.relay.enqueue(PersistTask::UpsertListings(rows));
        Ok(())
    }

    pub fn search_items(
        &self,
        predicates: &[ItemPredicate],
        page: usize,
        page_size: usize,
    ) -> Result<SearchPage> {
        self.federator.search_items(predicates, page, page_size)
    }

    pub fn search_listings(
        &self,
        predicates: &[ListingPredicate],
        page: usize,
        page_size: usize,
    ) -> Result<SearchPage> {
        self.federator.search_listings(predicates, page, page_size)
    }

    pub fn item(&self, id: EntityId) -> Result<Arc<Entity>> {
        self.federator.item(id)
    }

    pub fn listing(&self, id: EntityId) -> Result<Arc<Entity>> {
        self.federator.listing(id)
    }

    pub fn low_priced_items(&self, limit: usize) -> Result<Vec<Arc<Entity>>> {
        self.federator.low_priced_items(limit)
    }

    pub fn low_priced_listings(&self, limit: usize) -> Result<Vec<Arc<Entity>>> {
        self.federator.low_priced_listings(limit)
    }

    pub fn purchase(&self, id: EntityId) -> Result<()> {
        self.coordinator.purchase(id)
    }

    /// Validate a document request against a listing id.
    pub fn request_document(&self, id: EntityId) -> Result<()> {
        self.federator.listing(id).map(|_| ())
    }

    /// The static condition catalog, served verbatim by the condition
    /// endpoints.
    pub fn conditions(&self) -> &SearchConditions {
        &self.conditions
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Stop the persistence relay after draining its queue.
    pub fn close(&self) {
        self.relay.close();
    }
}
