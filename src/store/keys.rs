use crate::core::types::{EntityId, EntityKind};

/// Attribute name of the popularity ordering index.
pub const POPULARITY: &str = "popularity";

/// Point record: `item:id:42`
pub fn point(kind: EntityKind, id: EntityId) -> String {
    format!("{}:id:{}", kind.as_str(), id)
}

/// Range index: `item:price`
pub fn range(kind: EntityKind, attr: &str) -> String {
    format!("{}:{}", kind.as_str(), attr)
}

/// Set index for a categorical value: `item:color:red`
pub fn set(kind: EntityKind, attr: &str, value: &str) -> String {
    format!("{}:{}:{}", kind.as_str(), attr, value)
}

/// Set index for a feature-tag fingerprint: `item:features:9ae0daaf`
pub fn feature(kind: EntityKind, fingerprint: &str) -> String {
    format!("{}:features:{}", kind.as_str(), fingerprint)
}

/// Stock counter, Item only: `item:stock:42`
pub fn stock(id: EntityId) -> String {
    format!("{}:stock:{}", EntityKind::Item.as_str(), id)
}
