//! Core types for the layered configuration store.

use crate::error::{OverrideError, Result};
use crate::path::OverridePath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identifier of one configurable item.
///
/// Item ids are the leading segment of override paths, so they are
/// non-empty and never contain `.`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Validate and wrap an item id.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id.contains('.') {
            return Err(OverrideError::InvalidItemId(id));
        }
        Ok(ItemId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = OverrideError;

    fn from_str(s: &str) -> Result<Self> {
        ItemId::new(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = OverrideError;

    fn try_from(s: String) -> Result<Self> {
        ItemId::new(s)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> String {
        id.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single override operation.
///
/// Serialized as `{"op": "set", "path": ..., "value": ...}` or
/// `{"op": "delete", "path": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum OverrideOp {
    /// Assign `value` at `path`, creating intermediate structure as needed.
    Set { path: OverridePath, value: Value },

    /// Remove the item addressed by `path`. Deletion is item-granular:
    /// a field path here is ignored at resolve time.
    Delete { path: OverridePath },
}

impl OverrideOp {
    /// Build a set op.
    pub fn set(path: OverridePath, value: Value) -> Self {
        OverrideOp::Set { path, value }
    }

    /// Build a delete op for a whole item.
    pub fn delete(id: ItemId) -> Self {
        OverrideOp::Delete {
            path: OverridePath::item(id),
        }
    }

    /// The path this op addresses.
    pub fn path(&self) -> &OverridePath {
        match self {
            OverrideOp::Set { path, .. } => path,
            OverrideOp::Delete { path } => path,
        }
    }

    /// The item this op belongs to.
    pub fn item_id(&self) -> &ItemId {
        self.path().item_id()
    }

    /// Whether this op addresses `id` or a field inside it.
    pub fn concerns(&self, id: &ItemId) -> bool {
        self.item_id() == id
    }
}

/// A layered configuration: read-only defaults plus the override-op list.
///
/// The defaults map is externally owned and never mutated by this engine;
/// every mutation produces a brand-new op vector handed to the persistence
/// collaborator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideStore {
    /// Baseline configuration; an id may be absent (item created purely
    /// by override).
    pub defaults: BTreeMap<ItemId, Value>,

    /// Override operations, applied in list order.
    pub overrides: Vec<OverrideOp>,
}

impl OverrideStore {
    pub fn new(defaults: BTreeMap<ItemId, Value>, overrides: Vec<OverrideOp>) -> Self {
        Self {
            defaults,
            overrides,
        }
    }

    /// The ops belonging to one item (its path equals the id or sits
    /// under `id.`).
    pub fn item_ops(&self, id: &ItemId) -> Vec<OverrideOp> {
        self.overrides
            .iter()
            .filter(|op| op.concerns(id))
            .cloned()
            .collect()
    }
}
