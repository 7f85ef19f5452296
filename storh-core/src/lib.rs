// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # StorH Core
//!
//! Core types, models, and traits for the StorH shopping-list feed.
//!
//! This crate provides the foundational abstractions used across all other
//! StorH crates:
//!
//! - Domain models (credentials, groups, items, snapshots)
//! - Rendering options handed to the display layer
//! - Error types
//! - The [`SnapshotSink`] seam between polling and presentation
//!
//! ## Key Types
//!
//! - [`Credentials`] - Email/password pair, redacted in `Debug`
//! - [`GroupId`] - Opaque id of the user's shopping collection
//! - [`Item`] - A shopping-list entry
//! - [`Snapshot`] - Truncated, ordered items from one poll
//! - [`DisplayConfig`] - Header, item limit and fade options

pub mod error;
pub mod models;
pub mod traits;

pub use error::CoreError;

pub use models::{
    Count, Credentials, DisplayConfig, GroupId, GroupSummary, Item, Snapshot, DEFAULT_MAX_ITEMS,
};

pub use traits::SnapshotSink;
