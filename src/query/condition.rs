use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind, Result};

/// One named range: inclusive lower bound, exclusive upper bound.
/// `-1` is the "no bound" sentinel on either end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSpec {
    pub id: i64,
    pub min: i64,
    pub max: i64,
}

pub const UNBOUNDED: i64 = -1;

impl RangeSpec {
    /// Bounds for a `[min, max)` range lookup; `None` means unbounded.
    pub fn bounds(&self) -> (Option<i64>, Option<i64>) {
        let min = (self.min != UNBOUNDED).then_some(self.min);
        let max = (self.max != UNBOUNDED).then_some(self.max);
        (min, max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeCondition {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub ranges: Vec<RangeSpec>,
}

impl RangeCondition {
    /// Look up a named range by its index. An index past the end of the
    /// catalog is a client error.
    pub fn resolve(&self, range_id: usize) -> Result<&RangeSpec> {
        self.ranges.get(range_id).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidRangeId,
                format!("range id {} out of bounds ({} ranges)", range_id, self.ranges.len()),
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCondition {
    pub list: Vec<String>,
}

/// Search conditions for the item catalog, fixture-file shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemConditions {
    pub price: RangeCondition,
    pub height: RangeCondition,
    pub width: RangeCondition,
    pub depth: RangeCondition,
    pub color: ListCondition,
    pub kind: ListCondition,
    pub feature: ListCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingConditions {
    pub rent: RangeCondition,
    pub door_height: RangeCondition,
    pub door_width: RangeCondition,
    pub feature: ListCondition,
}

/// The process-wide search condition catalog: loaded once at startup,
/// read-only for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConditions {
    pub item: ItemConditions,
    pub listing: ListingConditions,
}

impl SearchConditions {
    pub fn from_json(item_json: &str, listing_json: &str) -> Result<Self> {
        Ok(SearchConditions {
            item: serde_json::from_str(item_json)?,
            listing: serde_json::from_str(listing_json)?,
        })
    }

    pub fn from_files(item_path: &Path, listing_path: &Path) -> Result<Self> {
        let item_json = std::fs::read_to_string(item_path)?;
        let listing_json = std::fs::read_to_string(listing_path)?;
        Self::from_json(&item_json, &listing_json)
    }
}
