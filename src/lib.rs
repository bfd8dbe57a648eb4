//! # Palimpsest
//!
//! A layered configuration store: a read-only defaults tree combined with
//! a user-editable list of override operations that patch, replace, or
//! delete entries without ever mutating the defaults.
//!
//! ## Core Concepts
//!
//! - **Defaults**: externally supplied, read-only baseline configuration
//! - **Override ops**: set/delete instructions, applied in list order
//! - **Computed values**: defaults with all applicable ops applied
//! - **Wrapped items**: normal-or-deleted views built for rendering
//! - **Editors**: translate user intents into brand-new op lists handed
//!   to an injected persistence sink
//!
//! ## Example
//!
//! ```
//! use palimpsest::{resolve, ItemEditor, ItemId, OverrideEditor, OverrideStore};
//! use serde_json::json;
//! use std::cell::RefCell;
//!
//! fn main() -> palimpsest::Result<()> {
//!     let mut store = OverrideStore::default();
//!     store
//!         .defaults
//!         .insert("gateway".parse()?, json!({"host": "localhost", "port": 4000}));
//!
//!     // Edits never touch the defaults; they produce a new op list.
//!     let saved = RefCell::new(Vec::new());
//!     {
//!         let mut editor = ItemEditor::new(&store, |ops: Vec<palimpsest::OverrideOp>| -> palimpsest::Result<()> {
//!             *saved.borrow_mut() = ops;
//!             Ok(())
//!         });
//!         editor.set_item_value("gateway", "port", Some(json!(9000)))?;
//!     }
//!     store.overrides = saved.into_inner();
//!
//!     let computed = resolve(&store);
//!     let gateway: ItemId = "gateway".parse()?;
//!     assert_eq!(computed[&gateway], json!({"host": "localhost", "port": 9000}));
//!     Ok(())
//! }
//! ```

pub mod editor;
pub mod error;
pub mod items;
pub mod path;
pub mod resolve;
pub mod types;

// Re-exports
pub use editor::{
    ArrayTableEditor, ItemEditor, ObjectTableEditor, OverrideEditor, SaveOverrides,
};
pub use error::{OverrideError, Result};
pub use items::{wrap_items, WrappedOverridableItem};
pub use path::OverridePath;
pub use resolve::resolve;
pub use types::{ItemId, OverrideOp, OverrideStore};
