//! Override resolution.

use crate::types::{ItemId, OverrideOp, OverrideStore};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Resolve a store into its computed item map.
///
/// Starts from a deep clone of the defaults and applies override ops in
/// list order. Duplicate or conflicting ops are not an error; later ops
/// win for identical paths.
pub fn resolve(store: &OverrideStore) -> BTreeMap<ItemId, Value> {
    let mut computed = store.defaults.clone();

    for op in &store.overrides {
        apply_op(&mut computed, op);
    }

    computed
}

/// Apply a single op to a computed item map.
fn apply_op(computed: &mut BTreeMap<ItemId, Value>, op: &OverrideOp) {
    match op {
        OverrideOp::Delete { path } => {
            if path.is_item() {
                computed.remove(path.item_id());
            } else {
                // Deletion is only supported at item granularity.
                warn!(path = %path, "ignoring delete op with a field path");
            }
        }

        OverrideOp::Set { path, value } => {
            let fields = path.fields();
            if fields.is_empty() {
                // Full item replace/create.
                computed.insert(path.item_id().clone(), value.clone());
            } else {
                let item = computed
                    .entry(path.item_id().clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                set_at_path(item, fields, value.clone());
            }
        }
    }
}

/// Assign `value` at a nested field path, creating intermediate objects
/// as needed. A non-object intermediate is replaced by an object.
pub(crate) fn set_at_path(target: &mut Value, fields: &[String], value: Value) {
    let Some((head, rest)) = fields.split_first() else {
        *target = value;
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        let slot = map.entry(head.clone()).or_insert(Value::Null);
        set_at_path(slot, rest, value);
    }
}

/// Remove the entry at a nested field path; no-op if any step is missing
/// or not an object.
pub(crate) fn remove_at_path(target: &mut Value, fields: &[String]) {
    let Some((head, rest)) = fields.split_first() else {
        return;
    };

    if let Value::Object(map) = target {
        if rest.is_empty() {
            map.remove(head);
        } else if let Some(child) = map.get_mut(head) {
            remove_at_path(child, rest);
        }
    }
}

/// Read the value at a nested field path.
pub(crate) fn value_at_path<'a>(target: &'a Value, fields: &[String]) -> Option<&'a Value> {
    fields
        .iter()
        .try_fold(target, |value, segment| value.as_object()?.get(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::OverridePath;
    use serde_json::json;

    fn id(s: &str) -> ItemId {
        ItemId::new(s).unwrap()
    }

    fn path(s: &str) -> OverridePath {
        OverridePath::parse(s).unwrap()
    }

    #[test]
    fn test_empty_store() {
        let computed = resolve(&OverrideStore::default());
        assert!(computed.is_empty());
    }

    #[test]
    fn test_defaults_pass_through() {
        let mut store = OverrideStore::default();
        store.defaults.insert(id("mapA"), json!({"device": 1}));

        let computed = resolve(&store);
        assert_eq!(computed[&id("mapA")], json!({"device": 1}));
    }

    #[test]
    fn test_root_set_replaces_item() {
        let mut store = OverrideStore::default();
        store.defaults.insert(id("mapA"), json!({"device": 1}));
        store
            .overrides
            .push(OverrideOp::set(path("mapA"), json!({"device": 9})));

        let computed = resolve(&store);
        assert_eq!(computed[&id("mapA")], json!({"device": 9}));
    }

    #[test]
    fn test_nested_set_synthesizes_missing_item() {
        // Item created purely by override: the resolver must create an
        // empty object before applying the nested assignment.
        let mut store = OverrideStore::default();
        store.overrides.push(OverrideOp::set(
            path("dev1.peripheralDeviceId"),
            json!("abc"),
        ));

        let computed = resolve(&store);
        assert_eq!(computed[&id("dev1")], json!({"peripheralDeviceId": "abc"}));
    }

    #[test]
    fn test_nested_set_deep_rest_path() {
        // Hand-authored ops may address arbitrary depth within the value.
        let mut store = OverrideStore::default();
        store.defaults.insert(id("table"), json!({"rows": {}}));
        store
            .overrides
            .push(OverrideOp::set(path("table.rows.r1.x"), json!(9)));

        let computed = resolve(&store);
        assert_eq!(computed[&id("table")], json!({"rows": {"r1": {"x": 9}}}));
    }

    #[test]
    fn test_delete_removes_item() {
        let mut store = OverrideStore::default();
        store.defaults.insert(id("mapA"), json!({"device": 1}));
        store.overrides.push(OverrideOp::delete(id("mapA")));

        let computed = resolve(&store);
        assert!(!computed.contains_key(&id("mapA")));
    }

    #[test]
    fn test_field_path_delete_is_ignored() {
        let mut store = OverrideStore::default();
        store.defaults.insert(id("mapA"), json!({"device": 1}));
        store.overrides.push(OverrideOp::Delete {
            path: path("mapA.device"),
        });

        let computed = resolve(&store);
        assert_eq!(computed[&id("mapA")], json!({"device": 1}));
    }

    #[test]
    fn test_later_op_wins_for_identical_paths() {
        let mut store = OverrideStore::default();
        store
            .overrides
            .push(OverrideOp::set(path("mapA.device"), json!(1)));
        store
            .overrides
            .push(OverrideOp::set(path("mapA.device"), json!(2)));

        let computed = resolve(&store);
        assert_eq!(computed[&id("mapA")]["device"], json!(2));
    }

    #[test]
    fn test_set_after_delete_recreates() {
        let mut store = OverrideStore::default();
        store.defaults.insert(id("mapA"), json!({"device": 1}));
        store.overrides.push(OverrideOp::delete(id("mapA")));
        store
            .overrides
            .push(OverrideOp::set(path("mapA.layerName"), json!("L")));

        let computed = resolve(&store);
        assert_eq!(computed[&id("mapA")], json!({"layerName": "L"}));
    }

    #[test]
    fn test_non_object_intermediate_is_replaced() {
        let mut target = json!({"a": 5});
        set_at_path(
            &mut target,
            &["a".to_string(), "b".to_string()],
            json!(true),
        );
        assert_eq!(target, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_remove_at_path() {
        let mut target = json!({"a": {"b": 1, "c": 2}});
        remove_at_path(&mut target, &["a".to_string(), "b".to_string()]);
        assert_eq!(target, json!({"a": {"c": 2}}));

        // Missing paths are a no-op.
        remove_at_path(&mut target, &["x".to_string(), "y".to_string()]);
        assert_eq!(target, json!({"a": {"c": 2}}));
    }

    #[test]
    fn test_value_at_path() {
        let target = json!({"rows": {"r1": {"x": 9}}});
        let fields = ["rows".to_string(), "r1".to_string(), "x".to_string()];
        assert_eq!(value_at_path(&target, &fields), Some(&json!(9)));
        assert_eq!(value_at_path(&target, &["nope".to_string()]), None);
    }
}
