// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # StorH Store
//!
//! State and configuration for the StorH feed.
//!
//! This crate provides:
//!
//! - **SnapshotStore**: the published snapshot and poll status, with watch channels
//! - **Config**: the JSON config file
//! - **Credentials**: login lookup across config, environment, and keychain
//! - **Persistence**: file I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use storh_store::{Config, SnapshotStore, resolve_credentials};
//!
//! let config = Config::load().await?;
//! let credentials = resolve_credentials(&config.account)?.credentials;
//!
//! let store = Arc::new(SnapshotStore::new());
//! let mut rx = store.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("{} items", rx.borrow().snapshot.as_ref().map_or(0, |s| s.len()));
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod persistence;
pub mod snapshot_store;

pub use config::{AccountConfig, Config, ServiceConfig};
pub use credentials::{
    resolve_credentials, resolve_credentials_with, CredentialSource, ResolvedCredentials,
    SecretStore, SystemKeychain, EMAIL_ENV, KEYCHAIN_SERVICE, PASSWORD_ENV,
};
pub use error::StoreError;
pub use persistence::{default_config_dir, default_config_path, ensure_dir, load_json, save_json};
pub use snapshot_store::{FeedState, SnapshotStore};

#[cfg(test)]
mod persistence_tests;
