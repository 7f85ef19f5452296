// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # StorH Fetch
//!
//! The authenticated fetch pipeline for the StorH shopping-list feed.
//!
//! Components, leaf first:
//!
//! - [`host::http`] - HTTP seam ([`HttpApi`]) and reqwest client
//! - [`transport::Transport`] - authenticated GETs with 401 recovery
//! - [`session::SessionManager`] - bearer token owner, single-flight login
//! - [`group::GroupResolver`] - first-group discovery, resolved once
//! - [`poll::PollScheduler`] - recurring item polling and publication
//! - [`bootstrap::Bootstrap`] - the startup state machine
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use storh_fetch::{Bootstrap, Endpoints, HttpClient, DEFAULT_POLL_INTERVAL};
//!
//! let http = Arc::new(HttpClient::new()?);
//! let bootstrap = Bootstrap::new(http, Endpoints::default(), sink, 10);
//! let feed = bootstrap.run(credentials, DEFAULT_POLL_INTERVAL).await?;
//! // ... later
//! feed.shutdown().await;
//! ```

pub mod bootstrap;
pub mod endpoints;
pub mod error;
pub mod group;
pub mod host;
pub mod poll;
pub mod session;
pub mod transport;

pub use bootstrap::{Bootstrap, BootstrapState, Connection, RunningFeed};
pub use endpoints::{Endpoints, DEFAULT_BASE_URL};
pub use error::FetchError;
pub use group::GroupResolver;
pub use host::{HttpApi, HttpClient, HttpResponse, DEFAULT_TIMEOUT_SECS};
pub use poll::{PollHandle, PollScheduler, DEFAULT_POLL_INTERVAL};
pub use session::{SessionManager, SessionTicket};
pub use transport::Transport;
