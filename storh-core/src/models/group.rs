//! Group types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier of a user's shopping collection.
///
/// The service may send the id as a JSON string or number; both are kept
/// as their textual form since the id is only ever echoed back in a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Creates a group id from its textual form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as sent to the service.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for GroupId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) if s.is_empty() => Err(serde::de::Error::custom("empty group id")),
            RawId::Text(s) => Ok(Self(s)),
            RawId::Number(n) => Ok(Self(n.to_string())),
        }
    }
}

/// A group entry as returned by the group listing endpoint.
///
/// Only `id` is required; other fields are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group identifier.
    pub id: GroupId,
    /// Display name, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
