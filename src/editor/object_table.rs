//! Table adapter for rows keyed by a stable generated row id.
//!
//! Rows live in an object field keyed by row id, so per-field granularity
//! survives row reordering. Rows that exist in the defaults are patched
//! granularly; ephemeral rows (override-only) have no baseline to patch
//! against and are replaced whole. Soft row deletion is a null marker at
//! the row path — a computed row equal to JSON null counts as deleted.

use crate::editor::{ItemEditor, OverrideEditor, SaveOverrides};
use crate::error::Result;
use crate::path::split_segments;
use crate::resolve::{remove_at_path, resolve, set_at_path, value_at_path};
use crate::types::{ItemId, OverrideStore};
use serde_json::{Map, Value};
use tracing::trace;

/// Row-level editing over an object-of-rows field.
pub struct ObjectTableEditor<'a, S: SaveOverrides> {
    base: ItemEditor<'a, S>,
    item: ItemId,
    fields: Vec<String>,
    /// Rows present in the defaults, by row id.
    default_rows: Map<String, Value>,
    /// Snapshot of the computed rows at construction time.
    computed_rows: Map<String, Value>,
}

impl<'a, S: SaveOverrides> ObjectTableEditor<'a, S> {
    /// Build an editor over the row object at `array_field` inside
    /// `item_id`. A missing or non-object field reads as an empty table.
    pub fn new(
        store: &'a OverrideStore,
        save: S,
        item_id: &str,
        array_field: &str,
    ) -> Result<Self> {
        let item = ItemId::new(item_id)?;
        let fields = split_segments(array_field)?;

        let default_rows = store
            .defaults
            .get(&item)
            .and_then(|value| value_at_path(value, &fields))
            .and_then(|value| value.as_object().cloned())
            .unwrap_or_default();
        let computed_rows = resolve(store)
            .get(&item)
            .and_then(|value| value_at_path(value, &fields))
            .and_then(|value| value.as_object().cloned())
            .unwrap_or_default();

        Ok(Self {
            base: ItemEditor::new(store, save),
            item,
            fields,
            default_rows,
            computed_rows,
        })
    }

    /// The computed rows this editor was built over. A null row is a
    /// soft-deleted default.
    pub fn rows(&self) -> &Map<String, Value> {
        &self.computed_rows
    }

    /// Delete a row: a recoverable null marker for defaulted rows, or
    /// forgetting the override entirely for ephemeral rows.
    pub fn delete_row(&mut self, row_id: &str) -> Result<()> {
        if self.live_row(row_id).is_none() {
            trace!(row = row_id, "delete of unknown or deleted row ignored");
            return Ok(());
        }

        if self.default_rows.contains_key(row_id) {
            self.base
                .set_field_path(&self.item, &self.row_path(row_id, &[]), None)
        } else {
            self.base
                .clear_field_path(&self.item, &self.row_path(row_id, &[]))
        }
    }

    fn live_row(&self, row_id: &str) -> Option<&Value> {
        match self.computed_rows.get(row_id) {
            None | Some(Value::Null) => None,
            Some(row) => Some(row),
        }
    }

    fn row_path(&self, row_id: &str, sub: &[String]) -> Vec<String> {
        let mut fields = self.fields.clone();
        fields.push(row_id.to_string());
        fields.extend_from_slice(sub);
        fields
    }
}

impl<S: SaveOverrides> OverrideEditor for ObjectTableEditor<'_, S> {
    fn set_item_value(&mut self, id: &str, sub_path: &str, value: Option<Value>) -> Result<()> {
        let Some(current) = self.live_row(id) else {
            // Benign UI race, not a programmer error.
            trace!(row = id, "edit of unknown or deleted row ignored");
            return Ok(());
        };
        let current = current.clone();

        if sub_path.is_empty() {
            return match value {
                Some(value) => {
                    self.base
                        .set_field_path(&self.item, &self.row_path(id, &[]), Some(value))
                }
                None => self.delete_row(id),
            };
        }

        let segments = split_segments(sub_path)?;
        if self.default_rows.contains_key(id) {
            // Defaulted row: keep per-field granularity.
            self.base
                .set_field_path(&self.item, &self.row_path(id, &segments), value)
        } else {
            // Ephemeral row: no baseline to patch against, replace whole.
            let mut row = current;
            match value {
                Some(value) => set_at_path(&mut row, &segments, value),
                None => remove_at_path(&mut row, &segments),
            }
            self.base
                .set_field_path(&self.item, &self.row_path(id, &[]), Some(row))
        }
    }

    fn clear_item_overrides(&mut self, id: &str, sub_path: &str) -> Result<()> {
        let segments = if sub_path.is_empty() {
            Vec::new()
        } else {
            split_segments(sub_path)?
        };
        self.base
            .clear_field_path(&self.item, &self.row_path(id, &segments))
    }
}
