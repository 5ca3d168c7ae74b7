use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use std::sync::Arc;

use catadex::core::catalog::Catalog;
use catadex::core::config::Config;
use catadex::core::error::Result;
use catadex::core::types::{EntityId, Item, Listing};
use catadex::query::condition::SearchConditions;
use catadex::query::predicate::ItemPredicate;
use catadex::relay::RelationalStore;
use catadex::store::memory::MemoryStore;

const ITEM_CONDITIONS: &str = r#"{
    "price": { "ranges": [
        { "id": 0, "min": -1, "max": 3000 },
        { "id": 1, "min": 3000, "max": 6000 },
        { "id": 2, "min": 6000, "max": -1 }
    ]},
    "height": { "ranges": [ { "id": 0, "min": -1, "max": 80 }, { "id": 1, "min": 80, "max": -1 } ]},
    "width": { "ranges": [ { "id": 0, "min": -1, "max": 80 }, { "id": 1, "min": 80, "max": -1 } ]},
    "depth": { "ranges": [ { "id": 0, "min": -1, "max": 80 }, { "id": 1, "min": 80, "max": -1 } ]},
    "color": { "list": ["red", "blue", "black", "white"] },
    "kind": { "list": ["office", "sofa", "stool"] },
    "feature": { "list": ["reclining", "washable", "headrest"] }
}"#;

const LISTING_CONDITIONS: &str = r#"{
    "rent": { "ranges": [ { "id": 0, "min": -1, "max": 100000 }, { "id": 1, "min": 100000, "max": -1 } ]},
    "doorHeight": { "ranges": [ { "id": 0, "min": -1, "max": -1 } ]},
    "doorWidth": { "ranges": [ { "id": 0, "min": -1, "max": -1 } ]},
    "feature": { "list": ["balcony"] }
}"#;

struct NullRelational;

impl RelationalStore for NullRelational {
    fn insert_items(&self, _rows: &[Item]) -> Result<()> {
        Ok(())
    }
    fn insert_listings(&self, _rows: &[Listing]) -> Result<()> {
        Ok(())
    }
    fn decrement_stock(&self, _id: EntityId) -> Result<()> {
        Ok(())
    }
}

/// Helper to generate a random item row
fn random_item(id: i64) -> Item {
    let mut rng = rand::thread_rng();
    let colors = ["red", "blue", "black", "white"];
    let kinds = ["office", "sofa", "stool"];
    let features = ["reclining", "washable", "headrest", ""];
    Item {
        id: EntityId(id),
        name: format!("chair {}", id),
        description: "benchmark row".to_string(),
        thumbnail: format!("/img/{}.png", id),
        price: rng.gen_range(500..10000),
        height: rng.gen_range(40..160),
        width: rng.gen_range(40..160),
        depth: rng.gen_range(40..160),
        color: colors[rng.gen_range(0..colors.len())].to_string(),
        features: features[rng.gen_range(0..features.len())].to_string(),
        kind: kinds[rng.gen_range(0..kinds.len())].to_string(),
        popularity: rng.gen_range(0..100000),
        stock: rng.gen_range(1..50),
    }
}

fn build_catalog(rows: usize) -> Catalog {
    let catalog = Catalog::open(
        Config::default(),
        SearchConditions::from_json(ITEM_CONDITIONS, LISTING_CONDITIONS).unwrap(),
        Arc::new(MemoryStore::new()),
        Arc::new(NullRelational),
    );
    let batch: Vec<Item> = (1..=rows as i64).map(random_item).collect();
    catalog.load_items(batch).unwrap();
    catalog
}

/// Benchmark a two-predicate search over a populated catalog
fn bench_search(c: &mut Criterion) {
    let catalog = build_catalog(3000);
    let predicates = [
        ItemPredicate::Color("red".to_string()),
        ItemPredicate::PriceRange(1),
    ];

    c.bench_function("search_color_and_price", |b| {
        b.iter(|| {
            let page = catalog.search_items(&predicates, 1, 20).unwrap();
            black_box(page.total)
        });
    });
}

/// Benchmark point lookups through the hot cache
fn bench_point_lookup(c: &mut Criterion) {
    let catalog = build_catalog(3000);
    let mut rng = rand::thread_rng();

    c.bench_function("point_lookup_hot", |b| {
        b.iter(|| {
            let id = EntityId(rng.gen_range(1..=3000));
            black_box(catalog.item(id).unwrap().id())
        });
    });
}

/// Benchmark bulk index writes
fn bench_bulk_load(c: &mut Criterion) {
    c.bench_function("bulk_load_500", |b| {
        b.iter(|| {
            let catalog = build_catalog(500);
            black_box(catalog.cache_stats().entries)
        });
    });
}

criterion_group!(benches, bench_search, bench_point_lookup, bench_bulk_load);
criterion_main!(benches);
