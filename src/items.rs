//! Item enumeration for the rendering layer.

use crate::resolve::resolve;
use crate::types::{ItemId, OverrideOp, OverrideStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A normal-or-deleted view of one configured item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WrappedOverridableItem {
    /// An item present in the computed configuration.
    Normal {
        id: ItemId,
        /// Defaults with this item's ops applied.
        computed: Value,
        /// Baseline value, absent for items created purely by override.
        defaults: Option<Value>,
        /// The ops addressing this item or its fields.
        override_ops: Vec<OverrideOp>,
    },

    /// A defaulted item hidden by a delete op. Recoverable: clearing the
    /// delete op restores the item at its default value.
    Deleted {
        id: ItemId,
        defaults: Value,
        override_ops: Vec<OverrideOp>,
    },
}

impl WrappedOverridableItem {
    pub fn id(&self) -> &ItemId {
        match self {
            WrappedOverridableItem::Normal { id, .. } => id,
            WrappedOverridableItem::Deleted { id, .. } => id,
        }
    }

    pub fn override_ops(&self) -> &[OverrideOp] {
        match self {
            WrappedOverridableItem::Normal { override_ops, .. } => override_ops,
            WrappedOverridableItem::Deleted { override_ops, .. } => override_ops,
        }
    }

    /// Whether any op touches this item.
    pub fn is_overridden(&self) -> bool {
        !self.override_ops().is_empty()
    }
}

/// Build the ordered item list for rendering.
///
/// Normal items are sorted by the supplied comparator over `(id, computed)`
/// pairs. Deleted items follow after all normal items, ordered by id —
/// never interleaved, so "still active" and "recoverable" entries stay
/// separate for consumers.
pub fn wrap_items<F>(store: &OverrideStore, mut compare: F) -> Vec<WrappedOverridableItem>
where
    F: FnMut((&ItemId, &Value), (&ItemId, &Value)) -> Ordering,
{
    let computed = resolve(store);

    let mut normal: Vec<(ItemId, Value)> = computed.into_iter().collect();
    normal.sort_by(|(a_id, a_value), (b_id, b_value)| {
        compare((a_id, a_value), (b_id, b_value))
    });

    let mut items: Vec<WrappedOverridableItem> = normal
        .into_iter()
        .map(|(id, value)| WrappedOverridableItem::Normal {
            override_ops: store.item_ops(&id),
            defaults: store.defaults.get(&id).cloned(),
            computed: value,
            id,
        })
        .collect();

    // Defaulted items removed by a delete op. BTreeMap iteration keeps
    // these ordered by id.
    let present: Vec<&ItemId> = items.iter().map(WrappedOverridableItem::id).collect();
    let deleted: Vec<WrappedOverridableItem> = store
        .defaults
        .iter()
        .filter(|(id, _)| !present.contains(id))
        .map(|(id, defaults)| WrappedOverridableItem::Deleted {
            id: id.clone(),
            defaults: defaults.clone(),
            override_ops: store.item_ops(id),
        })
        .collect();

    items.extend(deleted);
    items
}
