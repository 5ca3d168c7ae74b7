use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub i64);

impl EntityId {
    pub fn new(id: i64) -> Self {
        EntityId(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two catalogs. The string form is the key-namespace prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Item,
    Listing,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Item => "item",
            EntityKind::Listing => "listing",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A furniture item row. `features` is a comma-delimited tag field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub price: i64,
    pub height: i64,
    pub width: i64,
    pub depth: i64,
    pub color: String,
    pub features: String,
    pub kind: String,
    pub popularity: i64,
    pub stock: i64,
}

/// A rental listing row. Listings carry no stock and are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rent: i64,
    pub door_height: i64,
    pub door_width: i64,
    pub features: String,
    pub popularity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Item(Item),
    Listing(Listing),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Item(item) => item.id,
            Entity::Listing(listing) => listing.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Item(_) => EntityKind::Item,
            Entity::Listing(_) => EntityKind::Listing,
        }
    }

    pub fn popularity(&self) -> i64 {
        match self {
            Entity::Item(item) => item.popularity,
            Entity::Listing(listing) => listing.popularity,
        }
    }

    pub fn features(&self) -> &str {
        match self {
            Entity::Item(item) => &item.features,
            Entity::Listing(listing) => &listing.features,
        }
    }

    /// Range-indexed attributes, attribute name paired with the score.
    pub fn numeric_attrs(&self) -> Vec<(&'static str, i64)> {
        match self {
            Entity::Item(item) => vec![
                ("price", item.price),
                ("height", item.height),
                ("width", item.width),
                ("depth", item.depth),
            ],
            Entity::Listing(listing) => vec![
                ("rent", listing.rent),
                ("door_height", listing.door_height),
                ("door_width", listing.door_width),
            ],
        }
    }

    /// Set-indexed attributes, attribute name paired with the value.
    pub fn categorical_attrs(&self) -> Vec<(&'static str, &str)> {
        match self {
            Entity::Item(item) => vec![("color", &item.color), ("kind", &item.kind)],
            Entity::Listing(_) => Vec::new(),
        }
    }

    /// Initial stock, Item only.
    pub fn stock(&self) -> Option<i64> {
        match self {
            Entity::Item(item) => Some(item.stock),
            Entity::Listing(_) => None,
        }
    }
}
