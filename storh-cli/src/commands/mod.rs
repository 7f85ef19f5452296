//! CLI command implementations.

pub mod check;
pub mod config;
pub mod group;
pub mod items;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use storh_core::Credentials;
use storh_fetch::{Bootstrap, HttpClient};
use storh_store::{resolve_credentials, Config, SnapshotStore};

/// Everything a feed command needs before the first request.
pub struct Feed {
    /// Startup sequencer wired to `store`.
    pub bootstrap: Bootstrap,
    /// Receives every published snapshot.
    pub store: Arc<SnapshotStore>,
    /// Resolved login credentials.
    pub credentials: Credentials,
}

/// Resolves credentials and wires the HTTP client, store, and bootstrap.
pub fn prepare(config: &Config) -> Result<Feed> {
    let resolved = resolve_credentials(&config.account)?;
    info!(
        email = %resolved.credentials.email(),
        email_source = %resolved.email_source,
        password_source = %resolved.password_source,
        "Using credentials"
    );

    let http = HttpClient::with_timeout(config.service.request_timeout())
        .context("Failed to build HTTP client")?;
    let endpoints = config.service.endpoints()?;
    let store = Arc::new(SnapshotStore::new());
    let bootstrap = Bootstrap::new(
        Arc::new(http),
        endpoints,
        store.clone(),
        config.display.max_items,
    );

    Ok(Feed {
        bootstrap,
        store,
        credentials: resolved.credentials,
    })
}
