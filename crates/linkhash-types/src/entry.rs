use serde::{Deserialize, Serialize};

use crate::key::ShortKey;

/// A stored association between a short key and the original link.
///
/// Entries are immutable: once a store publishes an entry, its value never
/// changes and the entry is never removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The resolved key (candidate, possibly with a collision suffix).
    pub key: ShortKey,
    /// The original link, byte-for-byte as submitted.
    pub value: String,
}

impl Entry {
    /// Create a new entry.
    pub fn new(key: ShortKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    /// Returns `true` if this entry was disambiguated from a colliding link.
    pub fn is_collision(&self) -> bool {
        self.key.collision_index().is_some()
    }
}
