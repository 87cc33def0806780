//! Chain events as seen by the watcher.
//!
//! A [`ChainEvent`] is a decoded runtime event reduced to its pallet and
//! variant tags plus a JSON rendering of its fields. Named fields become a
//! JSON object, positional fields a JSON array.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One runtime event from a finalized block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Pallet (module) that emitted the event, e.g. `"Democracy"`.
    pub pallet: String,
    /// Event variant within the pallet, e.g. `"Started"`.
    pub variant: String,
    /// Event fields.
    pub fields: Value,
}

impl ChainEvent {
    /// Creates an event from its tags and fields.
    #[must_use]
    pub fn new(pallet: impl Into<String>, variant: impl Into<String>, fields: Value) -> Self {
        Self {
            pallet: pallet.into(),
            variant: variant.into(),
            fields,
        }
    }

    /// Returns `true` if the event carries exactly this tag.
    #[must_use]
    pub fn is(&self, pallet: &str, variant: &str) -> bool {
        self.pallet == pallet && self.variant == variant
    }

    /// Looks a field up by name, falling back to its position for events
    /// decoded without field names.
    #[must_use]
    pub fn field(&self, name: &str, position: usize) -> Option<&Value> {
        match &self.fields {
            Value::Object(map) => map.get(name),
            Value::Array(items) => items.get(position),
            _ => None,
        }
    }
}

/// Index of an on-chain referendum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferendumIndex(u32);

impl ReferendumIndex {
    /// Wraps a raw referendum index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Reads an index from a JSON number that fits in `u32`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        value
            .as_u64()
            .and_then(|raw| u32::try_from(raw).ok())
            .map(Self)
    }
}

impl fmt::Display for ReferendumIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
