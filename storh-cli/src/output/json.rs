//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use storh_core::{Count, DisplayConfig, GroupId, Snapshot};
use storh_store::FeedState;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for the feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub loading: bool,
    /// The items are from before the latest failed poll.
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_datetime_opt"
    )]
    pub fetched_at: Option<DateTime<Utc>>,
    pub items: Vec<ItemOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A single shopping-list row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutput {
    pub manufacturer: String,
    pub name: String,
    pub count: Count,
    /// Row opacity in `(0, 1]` when fading is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// Credential check result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutput {
    pub email: String,
    pub password_source: String,
    pub accepted: bool,
}

// ============================================================================
// Serialization helpers
// ============================================================================

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the feed state.
    pub fn format_feed(
        &self,
        state: &FeedState,
        group: Option<&GroupId>,
        display: &DisplayConfig,
    ) -> Result<String> {
        self.format(&Self::feed_output(state, group, display))
    }

    /// Converts feed state to output.
    pub fn feed_output(
        state: &FeedState,
        group: Option<&GroupId>,
        display: &DisplayConfig,
    ) -> FeedOutput {
        let snapshot = state.snapshot.as_ref();
        FeedOutput {
            group: group.map(ToString::to_string),
            loading: state.is_loading(),
            stale: state.is_stale(),
            sequence: snapshot.map(|s| s.sequence),
            fetched_at: snapshot.map(|s| s.fetched_at),
            items: snapshot.map_or_else(Vec::new, |s| Self::item_outputs(s, display)),
            error: state.last_error.clone(),
        }
    }

    fn item_outputs(snapshot: &Snapshot, display: &DisplayConfig) -> Vec<ItemOutput> {
        let fades = display.fades();
        snapshot
            .items
            .iter()
            .zip(display.row_opacities(snapshot.len()))
            .map(|(item, opacity)| ItemOutput {
                manufacturer: item.manufacturer.clone(),
                name: item.name.clone(),
                count: item.count.clone(),
                opacity: fades.then_some(opacity),
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
