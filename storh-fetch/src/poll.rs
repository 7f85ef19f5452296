//! Scheduled polling of the shopping list.
//!
//! [`PollScheduler`] fetches the item list for one group, truncates it and
//! publishes the result to a [`SnapshotSink`]. The recurring schedule skips
//! a tick while the previous poll is still running and survives poll
//! failures; only [`PollHandle::shutdown`] stops it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};
use url::Url;

use storh_core::{GroupId, Item, Snapshot, SnapshotSink};

use crate::endpoints::Endpoints;
use crate::error::FetchError;
use crate::transport::Transport;

/// Fixed polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(60_000);

// ============================================================================
// Poll Scheduler
// ============================================================================

/// Fetches and publishes shopping-list snapshots for a single group.
pub struct PollScheduler {
    transport: Arc<Transport>,
    group: GroupId,
    url: Url,
    max_items: usize,
    sink: Arc<dyn SnapshotSink>,
    sequence: AtomicU64,
    in_flight: AtomicBool,
}

impl std::fmt::Debug for PollScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollScheduler")
            .field("group", &self.group)
            .field("url", &self.url.as_str())
            .field("max_items", &self.max_items)
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl PollScheduler {
    /// Creates a scheduler for `group`, keeping at most `max_items` per snapshot.
    pub fn new(
        transport: Arc<Transport>,
        endpoints: &Endpoints,
        group: GroupId,
        max_items: usize,
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<Self, FetchError> {
        let url = endpoints.shopping_list(&group)?;
        Ok(Self {
            transport,
            group,
            url,
            max_items,
            sink,
            sequence: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        })
    }

    /// Fetches the item list once and publishes the resulting snapshot.
    ///
    /// The returned snapshot is the one this poll produced, even if the
    /// sink rejected it because a newer poll finished first.
    #[instrument(skip(self), fields(group = %self.group))]
    pub async fn poll_once(&self) -> Result<Snapshot, FetchError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let items: Vec<Item> = self.transport.fetch_result(&self.url).await?;
        let total = items.len();

        let snapshot = Snapshot::truncated(items, self.max_items, sequence);
        if self.sink.publish(snapshot.clone()) {
            debug!(sequence, total, kept = snapshot.len(), "Published snapshot");
        } else {
            debug!(sequence, "Discarded snapshot superseded by a newer poll");
        }
        Ok(snapshot)
    }

    /// Polls now and then every `interval` until shut down.
    pub fn start_recurring(self: &Arc<Self>, interval: Duration) -> PollHandle {
        self.spawn_schedule(time::interval(interval))
    }

    /// Polls every `interval`, starting one interval from now.
    ///
    /// Used after an initial [`poll_once`](Self::poll_once) so the first
    /// recurring poll does not follow it immediately.
    pub fn continue_recurring(self: &Arc<Self>, interval: Duration) -> PollHandle {
        self.spawn_schedule(time::interval_at(Instant::now() + interval, interval))
    }

    fn spawn_schedule(self: &Arc<Self>, mut ticker: Interval) -> PollHandle {
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let scheduler = Arc::clone(self);

        info!(
            group = %self.group,
            interval_ms = ticker.period().as_millis(),
            "Starting recurring poll"
        );

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }

                let Some(guard) = InFlightGuard::acquire(&scheduler) else {
                    debug!("Previous poll still in flight, skipping tick");
                    continue;
                };

                tokio::spawn(async move {
                    let scheduler = Arc::clone(&guard.scheduler);
                    if let Err(e) = scheduler.poll_once().await {
                        warn!(error = %e, "Poll failed, keeping previous snapshot");
                        scheduler.sink.record_failure(&e.to_string());
                    }
                    drop(guard);
                });
            }
            info!("Recurring poll stopped");
        });

        PollHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Marks a scheduled poll as running; cleared on drop, including on panic.
struct InFlightGuard {
    scheduler: Arc<PollScheduler>,
}

impl InFlightGuard {
    fn acquire(scheduler: &Arc<PollScheduler>) -> Option<Self> {
        if scheduler.in_flight.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Self {
            scheduler: Arc::clone(scheduler),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.scheduler.in_flight.store(false, Ordering::Release);
    }
}

// ============================================================================
// Poll Handle
// ============================================================================

/// Handle to a running recurring poll.
#[derive(Debug)]
pub struct PollHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Returns true if the schedule has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the schedule and waits for the scheduling loop to exit.
    ///
    /// A poll already in flight is allowed to finish and publish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Poll loop ended abnormally");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
