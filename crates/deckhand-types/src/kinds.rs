//! Opaque template identifiers.
//!
//! Block and item definitions are loaded elsewhere; the job engine only
//! carries their names around and compares them.

use serde::{Deserialize, Serialize};

/// Name of a block template (for example `"hull"` or `"deck"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKind(pub String);

/// Name of an item template carried as stock (for example `"plank"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKind(pub String);

impl BlockKind {
    /// Create a block kind from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the template name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ItemKind {
    /// Create an item kind from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the template name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&str> for ItemKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
