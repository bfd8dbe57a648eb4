//! Table adapter for rows with no stable identity beyond array position.
//!
//! Per-row paths are unsafe once rows shift, so this adapter never grants
//! per-row overrides: every edit clones the whole current array, mutates
//! the clone, and writes it back as one opaque override at the array
//! field path.

use crate::editor::{ItemEditor, OverrideEditor, SaveOverrides};
use crate::error::Result;
use crate::path::split_segments;
use crate::resolve::{remove_at_path, resolve, set_at_path, value_at_path};
use crate::types::{ItemId, OverrideStore};
use serde_json::Value;
use tracing::trace;

/// Row-level editing over an array-valued field, rows addressed by their
/// stringified index.
pub struct ArrayTableEditor<'a, S: SaveOverrides> {
    base: ItemEditor<'a, S>,
    item: ItemId,
    fields: Vec<String>,
    /// Snapshot of the computed array at construction time.
    rows: Vec<Value>,
}

impl<'a, S: SaveOverrides> ArrayTableEditor<'a, S> {
    /// Build an editor over the array at `array_field` inside `item_id`.
    ///
    /// A missing or non-array field reads as an empty table.
    pub fn new(
        store: &'a OverrideStore,
        save: S,
        item_id: &str,
        array_field: &str,
    ) -> Result<Self> {
        let item = ItemId::new(item_id)?;
        let fields = split_segments(array_field)?;
        let rows = resolve(store)
            .get(&item)
            .and_then(|value| value_at_path(value, &fields))
            .and_then(|value| value.as_array().cloned())
            .unwrap_or_default();

        Ok(Self {
            base: ItemEditor::new(store, save),
            item,
            fields,
            rows,
        })
    }

    /// The rows this editor was built over.
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Remove the row at the given index and write the spliced array back
    /// as one override.
    pub fn delete_row(&mut self, row_id: &str) -> Result<()> {
        let Some(index) = self.row_index(row_id) else {
            trace!(row = row_id, "delete of unknown row ignored");
            return Ok(());
        };

        let mut rows = self.rows.clone();
        rows.remove(index);
        self.write_rows(rows)
    }

    fn row_index(&self, row_id: &str) -> Option<usize> {
        let index = row_id.parse::<usize>().ok()?;
        (index < self.rows.len()).then_some(index)
    }

    fn write_rows(&mut self, rows: Vec<Value>) -> Result<()> {
        self.base
            .set_field_path(&self.item, &self.fields, Some(Value::Array(rows)))
    }
}

impl<S: SaveOverrides> OverrideEditor for ArrayTableEditor<'_, S> {
    fn set_item_value(&mut self, id: &str, sub_path: &str, value: Option<Value>) -> Result<()> {
        let Some(index) = self.row_index(id) else {
            trace!(row = id, "edit of unknown row ignored");
            return Ok(());
        };

        let mut rows = self.rows.clone();
        if sub_path.is_empty() {
            match value {
                Some(value) => rows[index] = value,
                None => {
                    rows.remove(index);
                }
            }
        } else {
            let segments = split_segments(sub_path)?;
            match value {
                Some(value) => set_at_path(&mut rows[index], &segments, value),
                None => remove_at_path(&mut rows[index], &segments),
            }
        }
        self.write_rows(rows)
    }

    /// Unsupported here: rows have no overrides of their own. Resetting
    /// requires clearing the array-field override at the parent level.
    fn clear_item_overrides(&mut self, _id: &str, _sub_path: &str) -> Result<()> {
        trace!("per-row clear is not supported for array tables");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::OverridePath;
    use crate::types::OverrideOp;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    fn id(s: &str) -> ItemId {
        ItemId::new(s).unwrap()
    }

    fn path(s: &str) -> OverridePath {
        OverridePath::parse(s).unwrap()
    }

    fn capture(saved: &RefCell<Vec<OverrideOp>>) -> impl FnMut(Vec<OverrideOp>) -> Result<()> + '_ {
        move |ops| {
            *saved.borrow_mut() = ops;
            Ok(())
        }
    }

    fn table_store() -> OverrideStore {
        let mut defaults = BTreeMap::new();
        defaults.insert(id("table"), json!({"rows": [{"a": 1}, {"a": 2}]}));
        OverrideStore::new(defaults, Vec::new())
    }

    #[test]
    fn test_delete_row_writes_whole_array_once() {
        let store = table_store();
        let saved = RefCell::new(Vec::new());
        let calls = RefCell::new(0usize);
        let mut editor = ArrayTableEditor::new(
            &store,
            |ops: Vec<OverrideOp>| -> Result<()> {
                *calls.borrow_mut() += 1;
                *saved.borrow_mut() = ops;
                Ok(())
            },
            "table",
            "rows",
        )
        .unwrap();

        editor.delete_row("0").unwrap();

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(
            *saved.borrow(),
            vec![OverrideOp::set(path("table.rows"), json!([{"a": 2}]))]
        );
    }

    #[test]
    fn test_set_row_field_clones_whole_array() {
        let store = table_store();
        let saved = RefCell::new(Vec::new());
        let mut editor =
            ArrayTableEditor::new(&store, capture(&saved), "table", "rows").unwrap();

        editor.set_item_value("1", "a", Some(json!(9))).unwrap();

        assert_eq!(
            *saved.borrow(),
            vec![OverrideOp::set(path("table.rows"), json!([{"a": 1}, {"a": 9}]))]
        );
    }

    #[test]
    fn test_replace_whole_row() {
        let store = table_store();
        let saved = RefCell::new(Vec::new());
        let mut editor =
            ArrayTableEditor::new(&store, capture(&saved), "table", "rows").unwrap();

        editor.set_item_value("0", "", Some(json!({"b": 5}))).unwrap();

        assert_eq!(
            *saved.borrow(),
            vec![OverrideOp::set(path("table.rows"), json!([{"b": 5}, {"a": 2}]))]
        );
    }

    #[test]
    fn test_unknown_row_is_silent_noop() {
        let store = table_store();
        let saved = RefCell::new(Vec::new());
        let mut editor =
            ArrayTableEditor::new(&store, capture(&saved), "table", "rows").unwrap();

        editor.set_item_value("7", "a", Some(json!(9))).unwrap();
        editor.delete_row("not-an-index").unwrap();

        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn test_clear_is_unsupported_noop() {
        let store = table_store();
        let saved = RefCell::new(Vec::new());
        let mut editor =
            ArrayTableEditor::new(&store, capture(&saved), "table", "rows").unwrap();

        editor.clear_item_overrides("0", "a").unwrap();

        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn test_reads_array_through_existing_override() {
        // The snapshot reflects the computed value, not the defaults.
        let mut store = table_store();
        store
            .overrides
            .push(OverrideOp::set(path("table.rows"), json!([{"a": 3}])));
        let saved = RefCell::new(Vec::new());
        let mut editor =
            ArrayTableEditor::new(&store, capture(&saved), "table", "rows").unwrap();

        assert_eq!(editor.rows(), &[json!({"a": 3})]);

        editor.set_item_value("0", "a", Some(json!(4))).unwrap();
        assert_eq!(
            *saved.borrow(),
            vec![OverrideOp::set(path("table.rows"), json!([{"a": 4}]))]
        );
    }
}
