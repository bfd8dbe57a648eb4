//! Error types for the override engine.

use crate::types::ItemId;
use thiserror::Error;

/// Main error type for override operations.
#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("Invalid rename of '{id}': {reason}")]
    InvalidRename { id: ItemId, reason: String },

    #[error("Cannot rename '{0}': item is sourced from defaults")]
    UnsupportedRename(ItemId),

    #[error("Sub-path '{0}' has more than one segment")]
    UnsupportedDeepPath(String),

    #[error("Invalid item id: {0}")]
    InvalidItemId(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Failed to save overrides: {0}")]
    Save(String),
}

/// Result type for override operations.
pub type Result<T> = std::result::Result<T, OverrideError>;
