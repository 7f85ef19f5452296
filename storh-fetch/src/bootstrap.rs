//! One-time startup sequence.
//!
//! ```text
//! Unauthenticated -> Authenticated -> GroupResolved -> Polling -> SteadyState
//!        \________________\_______________\_______________\____-> Failed
//! ```
//!
//! Every step waits for the previous one. Any error moves the sequence to
//! `Failed` and aborts it; the bootstrap itself is never retried.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use storh_core::{Credentials, GroupId, Snapshot, SnapshotSink};

use crate::endpoints::Endpoints;
use crate::error::FetchError;
use crate::group::GroupResolver;
use crate::host::HttpApi;
use crate::poll::{PollHandle, PollScheduler};
use crate::session::SessionManager;
use crate::transport::Transport;

// ============================================================================
// Bootstrap State
// ============================================================================

/// Where the startup sequence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// Nothing has happened yet.
    Unauthenticated,
    /// Login succeeded.
    Authenticated,
    /// The group id is known.
    GroupResolved,
    /// The first poll completed.
    Polling,
    /// Recurring polling is running.
    SteadyState,
    /// A step failed; the sequence was aborted.
    Failed,
}

impl BootstrapState {
    /// Returns true for states with no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::SteadyState | Self::Failed)
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated => "authenticated",
            Self::GroupResolved => "group resolved",
            Self::Polling => "polling",
            Self::SteadyState => "steady state",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Connected Feed
// ============================================================================

/// Result of a successful login and group resolution.
#[derive(Debug, Clone)]
pub struct Connection {
    /// The authenticated session.
    pub session: Arc<SessionManager>,
    /// The resolved group.
    pub group: GroupId,
    /// Scheduler for the resolved group.
    pub scheduler: Arc<PollScheduler>,
}

/// A feed that completed bootstrap and is polling.
#[derive(Debug)]
pub struct RunningFeed {
    /// Session, group and scheduler.
    pub connection: Connection,
    /// The snapshot published by the bootstrap poll.
    pub first_snapshot: Snapshot,
    /// Handle to the recurring schedule.
    pub handle: PollHandle,
}

impl RunningFeed {
    /// Stops recurring polling.
    pub async fn shutdown(self) {
        self.handle.shutdown().await;
    }
}

// ============================================================================
// Bootstrap
// ============================================================================

/// Drives login, group resolution, the first poll and recurring polling.
pub struct Bootstrap {
    http: Arc<dyn HttpApi>,
    endpoints: Endpoints,
    sink: Arc<dyn SnapshotSink>,
    max_items: usize,
    state: watch::Sender<BootstrapState>,
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("endpoints", &self.endpoints)
            .field("max_items", &self.max_items)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Bootstrap {
    /// Creates a sequencer publishing snapshots to `sink`.
    pub fn new(
        http: Arc<dyn HttpApi>,
        endpoints: Endpoints,
        sink: Arc<dyn SnapshotSink>,
        max_items: usize,
    ) -> Self {
        let (state, _) = watch::channel(BootstrapState::Unauthenticated);
        Self {
            http,
            endpoints,
            sink,
            max_items,
            state,
        }
    }

    /// Current state.
    pub fn state(&self) -> BootstrapState {
        *self.state.borrow()
    }

    /// Subscribes to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<BootstrapState> {
        self.state.subscribe()
    }

    /// Runs the whole sequence and leaves recurring polling running.
    pub async fn run(
        &self,
        credentials: Credentials,
        poll_interval: Duration,
    ) -> Result<RunningFeed, FetchError> {
        let connection = self.connect(credentials).await?;

        let first_snapshot = match connection.scheduler.poll_once().await {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(self.fail(e)),
        };
        self.advance(BootstrapState::Polling);

        let handle = connection.scheduler.continue_recurring(poll_interval);
        self.advance(BootstrapState::SteadyState);

        Ok(RunningFeed {
            connection,
            first_snapshot,
            handle,
        })
    }

    /// Logs in and resolves the group, stopping before any poll.
    pub async fn connect(&self, credentials: Credentials) -> Result<Connection, FetchError> {
        let session = Arc::new(SessionManager::new(
            Arc::clone(&self.http),
            &self.endpoints,
            credentials,
        )?);

        match session.login().await {
            Ok(true) => self.advance(BootstrapState::Authenticated),
            Ok(false) => {
                return Err(self.fail(FetchError::LoginFailed(
                    "the service rejected the credentials".to_string(),
                )));
            }
            Err(e) => return Err(self.fail(e)),
        }

        let transport = Arc::new(Transport::new(Arc::clone(&self.http), Arc::clone(&session)));
        let resolver = GroupResolver::new(Arc::clone(&transport), self.endpoints.clone());
        let group = match resolver.resolve().await {
            Ok(group) => group,
            Err(e) => return Err(self.fail(e)),
        };
        self.advance(BootstrapState::GroupResolved);

        let scheduler = PollScheduler::new(
            transport,
            &self.endpoints,
            group.clone(),
            self.max_items,
            Arc::clone(&self.sink),
        )
        .map_err(|e| self.fail(e))?;

        Ok(Connection {
            session,
            group,
            scheduler: Arc::new(scheduler),
        })
    }

    fn advance(&self, next: BootstrapState) {
        let previous = self.state.send_replace(next);
        info!(from = %previous, to = %next, "Bootstrap transition");
    }

    fn fail(&self, error: FetchError) -> FetchError {
        let previous = self.state.send_replace(BootstrapState::Failed);
        error!(from = %previous, error = %error, fatal = error.is_fatal(), "Bootstrap failed");
        error
    }
}

// ============================================================================
// Tests
// ============================================================================
