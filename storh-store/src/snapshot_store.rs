//! Published feed state.
//!
//! Holds the newest snapshot and the outcome of the latest poll, with
//! change notifications for the rendering layer.

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use storh_core::{Snapshot, SnapshotSink};

// ============================================================================
// Feed State
// ============================================================================

/// What the rendering layer sees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    /// Newest successfully fetched snapshot.
    pub snapshot: Option<Snapshot>,
    /// Message of the latest failed poll, cleared by the next success.
    pub last_error: Option<String>,
    /// Failed polls since the last success.
    pub consecutive_failures: u32,
    /// When the latest failure happened.
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl FeedState {
    /// Returns true until the first snapshot arrives.
    pub fn is_loading(&self) -> bool {
        self.snapshot.is_none()
    }

    /// Returns true if the shown snapshot is older than a failed poll.
    pub fn is_stale(&self) -> bool {
        self.snapshot.is_some() && self.last_error.is_some()
    }
}

// ============================================================================
// Snapshot Store
// ============================================================================

/// Observable holder of the feed state.
///
/// A snapshot only replaces the current one if it comes from a later poll,
/// so a slow response can never overwrite newer data. Failures keep the
/// current snapshot.
#[derive(Debug)]
pub struct SnapshotStore {
    state: watch::Sender<FeedState>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self { state }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Returns a copy of the current state.
    pub fn current(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.state.borrow().snapshot.clone()
    }

    /// Returns true until the first snapshot arrives.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }
}

impl SnapshotSink for SnapshotStore {
    fn publish(&self, snapshot: Snapshot) -> bool {
        let sequence = snapshot.sequence;
        let accepted = self.state.send_if_modified(|state| {
            if let Some(current) = &state.snapshot {
                if !snapshot.supersedes(current) {
                    debug!(
                        sequence,
                        current = current.sequence,
                        "Discarding out-of-order snapshot"
                    );
                    return false;
                }
            }

            state.snapshot = Some(snapshot);
            state.last_error = None;
            state.consecutive_failures = 0;
            true
        });

        if accepted {
            debug!(sequence, "Snapshot published");
        }
        accepted
    }

    fn record_failure(&self, message: &str) {
        self.state.send_modify(|state| {
            state.last_error = Some(message.to_string());
            state.consecutive_failures += 1;
            state.last_failure_at = Some(Utc::now());
            info!(
                failures = state.consecutive_failures,
                keeping_snapshot = state.snapshot.is_some(),
                "Recorded poll failure"
            );
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
