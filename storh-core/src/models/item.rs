//! Shopping-list items.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

/// A single shopping-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Manufacturer or brand name.
    #[serde(rename = "itemManu")]
    pub manufacturer: String,
    /// Item name.
    #[serde(rename = "itemName")]
    pub name: String,
    /// How many to buy, as the service sent it.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub count: Count,
}

impl Item {
    /// Creates a new item.
    pub fn new(
        manufacturer: impl Into<String>,
        name: impl Into<String>,
        count: impl Into<Count>,
    ) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            name: name.into(),
            count: count.into(),
        }
    }
}

// ============================================================================
// Count
// ============================================================================

/// Item quantity.
///
/// The service stores whatever the user typed, so a count may be a
/// fraction (`0.5`) or free text (`"2 pk"`). It is kept verbatim and only
/// ever displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Count {
    /// A JSON number.
    Number(Number),
    /// A JSON string.
    Text(String),
}

impl Default for Count {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.pad(&n.to_string()),
            Self::Text(s) => f.pad(s),
        }
    }
}

impl From<u32> for Count {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for Count {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for Count {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Count {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// `null` reads as an empty count instead of failing the whole list.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Count, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Count>::deserialize(deserializer)?.unwrap_or_default())
}
