/// Catadex end-to-end walkthrough:
/// - bulk-load a small item catalog
/// - attribute-filtered search with pagination
/// - purchase until exhaustion and watch the item leave the results
/// - point lookups and cache statistics

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
    "price": { "suffix": "yen", "ranges": [
        { "id": 0, "min": -1, "max": 10000 },
        { "id": 1, "min": 10000, "max": -1 }
    ]},
    "height": { "ranges": [ { "id": 0, "min": -1, "max": -1 } ]},
    "width": { "ranges": [ { "id": 0, "min": -1, "max": -1 } ]},
    "depth": { "ranges": [ { "id": 0, "min": -1, "max": -1 } ]},
    "color": { "list": ["red", "black"] },
    "kind": { "list": ["office"] },
    "feature": { "list": ["reclining", "washable"] }
}"#;

const LISTING_CONDITIONS: &str = r#"{
    "rent": { "ranges": [ { "id": 0, "min": -1, "max": -1 } ]},
    "doorHeight": { "ranges": [ { "id": 0, "min": -1, "max": -1 } ]},
    "doorWidth": { "ranges": [ { "id": 0, "min": -1, "max": -1 } ]},
    "feature": { "list": [] }
}"#;

/// Stand-in for the relational collaborator: just narrates the mirror writes.
struct PrintingRelational;

impl RelationalStore for PrintingRelational {
    fn insert_items(&self, rows: &[Item]) -> Result<()> {
        println!("  [relational] INSERT {} item rows", rows.len());
        Ok(())
    }
    fn insert_listings(&self, rows: &[Listing]) -> Result<()> {
        println!("  [relational] INSERT {} listing rows", rows.len());
        Ok(())
    }
    fn decrement_stock(&self, id: EntityId) -> Result<()> {
        println!("  [relational] UPDATE stock - 1 for item {}", id);
        Ok(())
    }
}

fn chair(id: i64, price: i64, color: &str, stock: i64, popularity: i64) -> Item {
    Item {
        id: EntityId(id),
        name: format!("chair {}", id),
        description: "demo chair".to_string(),
        thumbnail: format!("/img/{}.png", id),
        price,
        height: 90,
        width: 60,
        depth: 60,
        color: color.to_string(),
        features: "reclining, washable".to_string(),
        kind: "office".to_string(),
        popularity,
        stock,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("Opening catalog...");
    let catalog = Catalog::open(
        Config::default(),
        SearchConditions::from_json(ITEM_CONDITIONS, LISTING_CONDITIONS)?,
        Arc::new(MemoryStore::new()),
        Arc::new(PrintingRelational),
    );

    println!("Bulk-loading 4 items...");
    catalog.load_items(vec![
        chair(1, 4800, "red", 1, 70),
        chair(2, 12800, "red", 3, 95),
        chair(3, 7200, "black", 2, 40),
        chair(4, 3300, "red", 5, 20),
    ])?;

    let red = [ItemPredicate::Color("red".to_string())];
    let page = catalog.search_items(&red, 1, 20)?;
    println!("color=red -> {} hits:", page.total);
    for entity in &page.entities {
        println!("  #{} {}", entity.id(), entity.features());
    }

    let cheap_red = [
        ItemPredicate::Color("red".to_string()),
        ItemPredicate::PriceRange(0),
    ];
    let page = catalog.search_items(&cheap_red, 1, 20)?;
    println!("color=red, price<10000 -> {} hits", page.total);

    println!("Buying item 1 (stock 1)...");
    catalog.purchase(EntityId(1))?;

    let page = catalog.search_items(&red, 1, 20)?;
    println!("color=red after exhaustion -> {} hits", page.total);

    let detail = catalog.item(EntityId(1))?;
    println!("item 1 still resolvable by id: {:?}", detail.id());

    match catalog.purchase(EntityId(1)) {
        Err(e) => println!("second purchase rejected: {}", e),
        Ok(()) => println!("unexpected purchase success"),
    }

    let cheapest = catalog.low_priced_items(2)?;
    println!(
        "two cheapest in stock: {:?}",
        cheapest.iter().map(|e| e.id().value()).collect::<Vec<_>>()
    );

    let stats = catalog.cache_stats();
    println!(
        "hot cache: {} entries, {:.0}% hit rate",
        stats.entries,
        stats.hit_rate() * 100.0
    );

    println!("Draining persistence relay...");
    catalog.close();
    Ok(())
}
