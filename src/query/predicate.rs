/// One filter predicate against the item catalog. Range predicates carry a
/// range id resolved against the search condition catalog; `Features` is a
/// comma-delimited tag list that matches only ids carrying every tag.
#[derive(Debug, Clone)]
pub enum ItemPredicate {
    PriceRange(usize),
    HeightRange(usize),
    WidthRange(usize),
    DepthRange(usize),
    Color(String),
    Kind(String),
    Features(String),
}

#[derive(Debug, Clone)]
pub enum ListingPredicate {
    RentRange(usize),
    DoorHeightRange(usize),
    DoorWidthRange(usize),
    Features(String),
}
