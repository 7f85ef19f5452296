//! Trait definitions for the StorH feed.

use crate::models::Snapshot;

/// Receiver of published snapshots.
///
/// The poll scheduler publishes every successful poll here and reports
/// failures without interrupting its schedule. Implementations must keep
/// the newest snapshot: a snapshot whose sequence is not newer than the one
/// already held is rejected.
pub trait SnapshotSink: Send + Sync {
    /// Offers a new snapshot. Returns true if it replaced the current one.
    fn publish(&self, snapshot: Snapshot) -> bool;

    /// Records a failed poll. The current snapshot, if any, is kept.
    fn record_failure(&self, message: &str);
}
