//! Flat per-item mutation helper.

use crate::editor::{OverrideEditor, SaveOverrides};
use crate::error::{OverrideError, Result};
use crate::path::{split_segments, OverridePath};
use crate::resolve::{remove_at_path, set_at_path};
use crate::types::{ItemId, OverrideOp, OverrideStore};
use serde_json::Value;
use tracing::debug;

/// Reserved sub-path selecting an item's identity instead of a field.
const ID_FIELD: &str = "_id";

/// Translates user intents (set field, delete, rename, reset, replace)
/// into new override-op lists.
///
/// Built over a store snapshot; every mutation derives the full new op
/// vector from that snapshot and saves it exactly once. At most one op
/// per unique path is ever produced.
pub struct ItemEditor<'a, S: SaveOverrides> {
    store: &'a OverrideStore,
    save: S,
}

impl<'a, S: SaveOverrides> ItemEditor<'a, S> {
    pub fn new(store: &'a OverrideStore, save: S) -> Self {
        Self { store, save }
    }

    /// Drop all ops belonging to `id`.
    ///
    /// Distinct from deletion: a defaulted item reappears unmodified at
    /// its default value; an override-only item disappears without a
    /// delete marker ever being written.
    pub fn reset_item(&mut self, id: &str) -> Result<()> {
        let item = ItemId::new(id)?;
        let new_ops = self.ops_without_item(&item);
        self.commit(new_ops)
    }

    /// Replace the item's whole value with a single root set op.
    pub fn replace_item(&mut self, id: &str, value: Value) -> Result<()> {
        self.set_item_value(id, "", Some(value))
    }

    /// Delete the item: soft and recoverable when defaults exist,
    /// otherwise the item simply vanishes.
    pub fn delete_item(&mut self, id: &str) -> Result<()> {
        self.set_item_value(id, "", None)
    }

    /// Give an override-only item a new id.
    pub fn change_item_id(&mut self, old_id: &str, new_id: &str) -> Result<()> {
        self.set_item_value(old_id, ID_FIELD, Some(Value::String(new_id.to_string())))
    }

    /// Set or clear a value at a (possibly deep) field path. Used by the
    /// table adapters, which compose row addressing on top of the flat
    /// path model.
    pub(crate) fn set_field_path(
        &mut self,
        item: &ItemId,
        fields: &[String],
        value: Option<Value>,
    ) -> Result<()> {
        if fields.is_empty() {
            return match value {
                Some(value) => self.replace(item.clone(), value),
                None => self.delete(item.clone()),
            };
        }

        // A root set op is the item's entire representation: mutate a
        // clone of its value rather than layering a second op on top.
        let root_set = self
            .store
            .overrides
            .iter()
            .position(|op| matches!(op, OverrideOp::Set { path, .. } if path.is_item())
                && op.item_id() == item);

        if let Some(index) = root_set {
            let mut new_ops = self.store.overrides.clone();
            if let OverrideOp::Set {
                value: root_value, ..
            } = &mut new_ops[index]
            {
                match value {
                    Some(value) => set_at_path(root_value, fields, value),
                    None => remove_at_path(root_value, fields),
                }
            }
            return self.commit(new_ops);
        }

        // The op grammar has no field-level delete, so an absent value at
        // a field path is encoded as a set of JSON null.
        let path = OverridePath::field(item.clone(), fields.to_vec())?;
        let mut new_ops: Vec<OverrideOp> = self
            .store
            .overrides
            .iter()
            .filter(|op| op.path() != &path)
            .cloned()
            .collect();
        new_ops.push(OverrideOp::set(path, value.unwrap_or(Value::Null)));
        self.commit(new_ops)
    }

    /// Drop the single op at exactly `item[.fields]`. Used by the table
    /// adapters.
    pub(crate) fn clear_field_path(&mut self, item: &ItemId, fields: &[String]) -> Result<()> {
        let path = OverridePath::field(item.clone(), fields.to_vec())?;
        let new_ops: Vec<OverrideOp> = self
            .store
            .overrides
            .iter()
            .filter(|op| op.path() != &path)
            .cloned()
            .collect();
        self.commit(new_ops)
    }

    fn replace(&mut self, item: ItemId, value: Value) -> Result<()> {
        let mut new_ops = self.ops_without_item(&item);
        new_ops.push(OverrideOp::set(OverridePath::item(item), value));
        self.commit(new_ops)
    }

    fn delete(&mut self, item: ItemId) -> Result<()> {
        let mut new_ops = self.ops_without_item(&item);
        if self.store.defaults.contains_key(&item) {
            new_ops.push(OverrideOp::delete(item));
        }
        self.commit(new_ops)
    }

    fn rename(&mut self, old_id: ItemId, value: Option<Value>) -> Result<()> {
        let new_id = match value {
            Some(Value::String(ref s)) if !s.is_empty() => {
                ItemId::new(s.clone()).map_err(|_| OverrideError::InvalidRename {
                    id: old_id.clone(),
                    reason: format!("'{}' is not a valid item id", s),
                })?
            }
            _ => {
                return Err(OverrideError::InvalidRename {
                    id: old_id,
                    reason: "new id must be a non-empty string".to_string(),
                })
            }
        };

        // Renaming a defaulted item would desync its identity from the
        // external source of the defaults.
        if self.store.defaults.contains_key(&old_id) {
            return Err(OverrideError::UnsupportedRename(old_id));
        }

        if new_id != old_id {
            if self.store.defaults.contains_key(&new_id) {
                return Err(OverrideError::InvalidRename {
                    id: old_id,
                    reason: format!("'{}' is already a defaulted item", new_id),
                });
            }
            if self.store.overrides.iter().any(|op| op.item_id() == &new_id) {
                return Err(OverrideError::InvalidRename {
                    id: old_id,
                    reason: format!("'{}' is already in use", new_id),
                });
            }
        }

        let new_ops = self
            .store
            .overrides
            .iter()
            .map(|op| {
                if !op.concerns(&old_id) {
                    return op.clone();
                }
                match op {
                    OverrideOp::Set { path, value } => {
                        let mut value = value.clone();
                        if path.is_item() {
                            // A whole-item payload carrying its own
                            // identity field must stay in sync.
                            if let Value::Object(map) = &mut value {
                                if let Some(slot) = map.get_mut(ID_FIELD) {
                                    *slot = Value::String(new_id.as_str().to_string());
                                }
                            }
                        }
                        OverrideOp::Set {
                            path: path.with_item(new_id.clone()),
                            value,
                        }
                    }
                    OverrideOp::Delete { path } => OverrideOp::Delete {
                        path: path.with_item(new_id.clone()),
                    },
                }
            })
            .collect();
        self.commit(new_ops)
    }

    fn ops_without_item(&self, item: &ItemId) -> Vec<OverrideOp> {
        self.store
            .overrides
            .iter()
            .filter(|op| !op.concerns(item))
            .cloned()
            .collect()
    }

    fn commit(&mut self, new_ops: Vec<OverrideOp>) -> Result<()> {
        debug!(ops = new_ops.len(), "saving overrides");
        self.save.save_overrides(new_ops)
    }
}

impl<S: SaveOverrides> OverrideEditor for ItemEditor<'_, S> {
    fn set_item_value(&mut self, id: &str, sub_path: &str, value: Option<Value>) -> Result<()> {
        let item = ItemId::new(id)?;

        if sub_path.is_empty() {
            return match value {
                Some(value) => self.replace(item, value),
                None => self.delete(item),
            };
        }

        if sub_path == ID_FIELD {
            return self.rename(item, value);
        }

        if sub_path.contains('.') {
            return Err(OverrideError::UnsupportedDeepPath(sub_path.to_string()));
        }
        self.set_field_path(&item, &[sub_path.to_string()], value)
    }

    fn clear_item_overrides(&mut self, id: &str, sub_path: &str) -> Result<()> {
        let item = ItemId::new(id)?;
        let fields = if sub_path.is_empty() {
            Vec::new()
        } else {
            split_segments(sub_path)?
        };
        self.clear_field_path(&item, &fields)
    }
}
