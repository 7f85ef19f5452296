//! Item snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::Item;

/// The most recently fetched, truncated, ordered set of items.
///
/// Every successful poll produces a brand-new snapshot that fully replaces
/// the previous one. `sequence` is assigned when the poll starts, so a
/// newer poll always carries a larger sequence than an older one even if
/// its response arrives first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Items in service order.
    pub items: Vec<Item>,
    /// Poll sequence number.
    pub sequence: u64,
    /// When the poll response was received.
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Builds a snapshot from a full item list, keeping at most `max_items`.
    ///
    /// Excess items are dropped, not paginated.
    pub fn truncated(mut items: Vec<Item>, max_items: usize, sequence: u64) -> Self {
        items.truncate(max_items);
        Self {
            items,
            sequence,
            fetched_at: Utc::now(),
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the snapshot has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if this snapshot came from a later poll than `other`.
    pub fn supersedes(&self, other: &Snapshot) -> bool {
        self.sequence > other.sequence
    }
}
