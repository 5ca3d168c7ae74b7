use std::sync::Arc;

use tracing::error;

use crate::cache::hot::HotCache;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Entity, EntityId, EntityKind};
use crate::index::fingerprint::{feature_fingerprint, split_features};
use crate::query::federator::load_point;
use crate::relay::{PersistTask, PersistenceRelay};
use crate::store::keys;
use crate::store::{IndexStore, StoreOp};

/// Decrements item stock and retires exhausted items from search.
///
/// State machine per item id:
/// AVAILABLE (stock > 0, in the indexes) -> EXHAUSTED (stock 0, point record
/// retained, absent from every range/set index). The transition fires exactly
/// once, on the decrement that reaches 0, and is terminal.
pub struct PurchaseCoordinator {
    store: Arc<dyn IndexStore>,
    cache: Arc<HotCache>,
    relay: Arc<PersistenceRelay>,
}

impl PurchaseCoordinator {
    pub fn new(
        store: Arc<dyn IndexStore>,
        cache: Arc<HotCache>,
        relay: Arc<PersistenceRelay>,
    ) -> Self {
        PurchaseCoordinator {
            store,
            cache,
            relay,
        }
    }

    /// Buy one unit. The conditional decrement is the race arbiter: of two
    /// concurrent purchases of the last unit, exactly one succeeds and the
    /// other gets OutOfStock. The relational mirror is asynchronous; success
    /// here does not wait for it.
    pub fn purchase(&self, id: EntityId) -> Result<()> {
        let stock_key = keys::stock(id);
        let current = self.store.get_counter(&stock_key)?.ok_or_else(|| {
            Error::new(ErrorKind::NotFound, format!("no item with id {}", id))
        })?;
        if current <= 0 {
            return Err(Error::new(
                ErrorKind::OutOfStock,
                format!("item {} is out of stock", id),
            ));
        }

        let Some(remaining) = self.store.decr_counter(&stock_key)? else {
            return Err(Error::new(
                ErrorKind::OutOfStock,
                format!("item {} is out of stock", id),
            ));
        };

        if remaining <= 0 {
            // The decrement is the authoritative effect; a failed removal
            // leaves phantom index entries but can never oversell.
            self.remove_from_indexes(id);
        }

        self.relay.enqueue(PersistTask::StockDecrement { id });
        Ok(())
    }

    fn remove_from_indexes(&self, id: EntityId) {
        match self.removal_ops(id) {
            Ok(ops) => {
                if let Err(e) = self.store.apply(ops) {
                    error!(item = id.value(), "index removal after exhaustion failed: {}", e);
                }
            }
            Err(e) => {
                error!(item = id.value(), "could not resolve exhausted item for removal: {}", e);
            }
        }
    }

    /// Every index membership the writer created for this item.
    fn removal_ops(&self, id: EntityId) -> Result<Vec<StoreOp>> {
        let kind = EntityKind::Item;
        let entity: Arc<Entity> =
            load_point(&self.store, &self.cache, kind, id)?.ok_or_else(|| {
                Error::new(
                    ErrorKind::IndexCacheDesync,
                    format!("point record missing for stocked item {}", id),
                )
            })?;

        let mut ops = Vec::new();
        for (attr, _) in entity.numeric_attrs() {
            ops.push(StoreOp::ZRem {
                key: keys::range(kind, attr),
                id,
            });
        }
        ops.push(StoreOp::ZRem {
            key: keys::range(kind, keys::POPULARITY),
            id,
        });
        for (attr, value) in entity.categorical_attrs() {
            ops.push(StoreOp::SRem {
                key: keys::set(kind, attr, value),
                id,
            });
        }
        for tag in split_features(entity.features()) {
            ops.push(StoreOp::SRem {
                key: keys::feature(kind, &feature_fingerprint(tag)),
                id,
            });
        }
        Ok(ops)
    }
}
