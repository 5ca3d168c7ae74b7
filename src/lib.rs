pub mod core;
pub mod codec;
pub mod store;
pub mod index;
pub mod query;
pub mod cache;
pub mod stock;
pub mod relay;

/*
┌──────────────────────────────────────────────────────────────────────┐
│                        CATADEX DATA FLOW                             │
└──────────────────────────────────────────────────────────────────────┘

 bulk load ──> IndexWriter ──> IndexStore (atomic group)
                                   │
                                   └──> PersistenceRelay ──> RelationalStore
                                        (bounded queue, fire-and-forget)

 search ──> QueryFederator ──> per-predicate IndexStore lookups
                │                  (range / set / tag-intersection)
                ├── intersect ids, order by popularity, paginate
                └── hydrate page ids: HotCache ──> IndexStore point record

 purchase ──> PurchaseCoordinator ──> conditional stock decrement
                │                     (atomic, exactly one 0-crossing)
                ├── on 0: remove id from every range/set index
                └──> PersistenceRelay ──> RelationalStore
*/
