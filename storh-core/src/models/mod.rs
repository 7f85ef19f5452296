//! Domain models for the StorH feed.
//!
//! ## Submodules
//!
//! - [`credentials`] - Account credentials
//! - [`group`] - Group identifiers
//! - [`item`] - Shopping-list items
//! - [`snapshot`] - Truncated item snapshots
//! - [`display`] - Rendering options

mod credentials;
mod display;
mod group;
mod item;
mod snapshot;

pub use credentials::Credentials;
pub use display::{DisplayConfig, DEFAULT_MAX_ITEMS};
pub use group::{GroupId, GroupSummary};
pub use item::{Count, Item};
pub use snapshot::Snapshot;
