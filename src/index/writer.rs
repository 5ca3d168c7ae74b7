use std::sync::Arc;

use rayon::prelude::*;

use crate::codec;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Entity;
use crate::index::fingerprint::{feature_fingerprint, split_features};
use crate::store::keys;
use crate::store::{IndexStore, StoreOp};

/// Projects entity rows into derived index entries and applies them to the
/// index store as one atomic group.
pub struct IndexWriter {
    store: Arc<dyn IndexStore>,
}

impl IndexWriter {
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        IndexWriter { store }
    }

    /// Write a batch of entities. Either every entity in the batch becomes
    /// visible and queryable or none do; on failure the batch must not be
    /// considered persisted (and the persistence relay must not be notified).
    /// Re-running the same batch leaves the index observably unchanged.
    pub fn write_batch(&self, entities: &[Entity]) -> Result<()> {
        let projected: Vec<Result<Vec<StoreOp>>> =
            entities.par_iter().map(project_entity).collect();

        // Flatten in input order
        let mut ops = Vec::new();
        for entity_ops in projected {
            ops.extend(entity_ops?);
        }

        self.store
            .apply(ops)
            .map_err(|e| Error::new(ErrorKind::IndexWrite, format!("batch apply failed: {}", e)))
    }
}

/// Derived entries for one entity: point record, one range-index score per
/// numeric attribute plus popularity, one set membership per categorical
/// value and per distinct feature tag, and the stock counter for items.
fn project_entity(entity: &Entity) -> Result<Vec<StoreOp>> {
    let kind = entity.kind();
    let id = entity.id();
    let mut ops = Vec::new();

    ops.push(StoreOp::SetBlob {
        key: keys::point(kind, id),
        value: codec::encode(entity)?,
    });

    for (attr, score) in entity.numeric_attrs() {
        ops.push(StoreOp::ZAdd {
            key: keys::range(kind, attr),
            id,
            score,
        });
    }
    ops.push(StoreOp::ZAdd {
        key: keys::range(kind, keys::POPULARITY),
        id,
        score: entity.popularity(),
    });

    for (attr, value) in entity.categorical_attrs() {
        ops.push(StoreOp::SAdd {
            key: keys::set(kind, attr, value),
            id,
        });
    }

    for tag in split_features(entity.features()) {
        ops.push(StoreOp::SAdd {
            key: keys::feature(kind, &feature_fingerprint(tag)),
            id,
        });
    }

    if let Some(stock) = entity.stock() {
        ops.push(StoreOp::SetCounter {
            key: keys::stock(id),
            value: stock,
        });
    }

    Ok(ops)
}
