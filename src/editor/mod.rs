//! Mutation helpers translating user edits into new override-op lists.
//!
//! Editors never mutate a store. Each call computes a brand-new op vector
//! from the snapshot it was built over and hands it to the injected
//! [`SaveOverrides`] sink exactly once. Callers refresh their store from
//! the persisted ops and rebuild editors before the next mutation;
//! interleaved mutations against a stale snapshot clobber each other at
//! whole-list granularity.

mod array_table;
mod item;
mod object_table;

pub use array_table::ArrayTableEditor;
pub use item::ItemEditor;
pub use object_table::ObjectTableEditor;

use crate::error::Result;
use crate::types::OverrideOp;
use serde_json::Value;

/// Persistence seam: receives each newly computed op list.
///
/// Durability is the collaborator's concern; a returned error propagates
/// synchronously to the mutation caller and nothing is applied partially.
pub trait SaveOverrides {
    fn save_overrides(&mut self, ops: Vec<OverrideOp>) -> Result<()>;
}

impl<F> SaveOverrides for F
where
    F: FnMut(Vec<OverrideOp>) -> Result<()>,
{
    fn save_overrides(&mut self, ops: Vec<OverrideOp>) -> Result<()> {
        self(ops)
    }
}

/// Editing surface shared by the flat item editor and both table adapters.
///
/// For [`ItemEditor`] the id names an item; for the table adapters it
/// names a row (a stringified index for array tables, a generated row id
/// for object tables).
pub trait OverrideEditor {
    /// Set a value at `sub_path` under `id`, or clear it with `None`.
    ///
    /// An empty `sub_path` replaces (`Some`) or deletes (`None`) the whole
    /// entry.
    fn set_item_value(&mut self, id: &str, sub_path: &str, value: Option<Value>) -> Result<()>;

    /// Drop the override op addressing `id[.sub_path]`.
    fn clear_item_overrides(&mut self, id: &str, sub_path: &str) -> Result<()>;
}
