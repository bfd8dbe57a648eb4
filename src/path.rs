//! Override paths.
//!
//! A path addresses either a whole item or a field inside an item's value.
//! Dotted strings (`mapA.layerName`) are only the serialization format;
//! paths are parsed and validated once at the boundary and carried as a
//! sum type everywhere else.

use crate::error::{OverrideError, Result};
use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed override path.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OverridePath {
    /// The item itself (a bare item id).
    Item(ItemId),

    /// A field inside the item's value. `fields` is never empty; each
    /// segment is non-empty and contains no `.`.
    Field { item: ItemId, fields: Vec<String> },
}

impl OverridePath {
    /// Path addressing a whole item.
    pub fn item(id: ItemId) -> Self {
        OverridePath::Item(id)
    }

    /// Path addressing a field inside an item's value.
    ///
    /// An empty `fields` list collapses to an item path.
    pub fn field(item: ItemId, fields: Vec<String>) -> Result<Self> {
        if fields.is_empty() {
            return Ok(OverridePath::Item(item));
        }
        for segment in &fields {
            if segment.is_empty() || segment.contains('.') {
                return Err(OverrideError::InvalidPath(format!(
                    "bad segment '{}' under item '{}'",
                    segment, item
                )));
            }
        }
        Ok(OverridePath::Field { item, fields })
    }

    /// Parse a dotted path string.
    pub fn parse(s: &str) -> Result<Self> {
        let segments = split_segments(s)?;
        let mut iter = segments.into_iter();
        let item = match iter.next() {
            Some(head) => ItemId::new(head)?,
            None => return Err(OverrideError::InvalidPath(s.to_string())),
        };
        let fields: Vec<String> = iter.collect();
        if fields.is_empty() {
            Ok(OverridePath::Item(item))
        } else {
            Ok(OverridePath::Field { item, fields })
        }
    }

    /// The item this path belongs to (leading segment).
    pub fn item_id(&self) -> &ItemId {
        match self {
            OverridePath::Item(id) => id,
            OverridePath::Field { item, .. } => item,
        }
    }

    /// Field segments below the item; empty for an item path.
    pub fn fields(&self) -> &[String] {
        match self {
            OverridePath::Item(_) => &[],
            OverridePath::Field { fields, .. } => fields,
        }
    }

    /// Whether this path addresses a whole item.
    pub fn is_item(&self) -> bool {
        matches!(self, OverridePath::Item(_))
    }

    /// The same path re-homed under a different item.
    pub fn with_item(&self, id: ItemId) -> Self {
        match self {
            OverridePath::Item(_) => OverridePath::Item(id),
            OverridePath::Field { fields, .. } => OverridePath::Field {
                item: id,
                fields: fields.clone(),
            },
        }
    }
}

/// Split a dotted string into segments, rejecting empty segments.
pub(crate) fn split_segments(s: &str) -> Result<Vec<String>> {
    if s.is_empty() {
        return Err(OverrideError::InvalidPath(s.to_string()));
    }
    let segments: Vec<String> = s.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(OverrideError::InvalidPath(s.to_string()));
    }
    Ok(segments)
}

impl fmt::Display for OverridePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverridePath::Item(id) => write!(f, "{}", id),
            OverridePath::Field { item, fields } => {
                write!(f, "{}.{}", item, fields.join("."))
            }
        }
    }
}

impl fmt::Debug for OverridePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OverridePath({})", self)
    }
}

impl FromStr for OverridePath {
    type Err = OverrideError;

    fn from_str(s: &str) -> Result<Self> {
        OverridePath::parse(s)
    }
}

impl TryFrom<String> for OverridePath {
    type Error = OverrideError;

    fn try_from(s: String) -> Result<Self> {
        OverridePath::parse(&s)
    }
}

impl From<OverridePath> for String {
    fn from(path: OverridePath) -> String {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_path() {
        let path = OverridePath::parse("mapA").unwrap();
        assert!(path.is_item());
        assert_eq!(path.item_id().as_str(), "mapA");
        assert!(path.fields().is_empty());
    }

    #[test]
    fn test_parse_field_path() {
        let path = OverridePath::parse("mapA.layerName").unwrap();
        assert!(!path.is_item());
        assert_eq!(path.item_id().as_str(), "mapA");
        assert_eq!(path.fields(), ["layerName"]);
    }

    #[test]
    fn test_parse_deep_field_path() {
        let path = OverridePath::parse("table.rows.r1.x").unwrap();
        assert_eq!(path.item_id().as_str(), "table");
        assert_eq!(path.fields(), ["rows", "r1", "x"]);
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(OverridePath::parse("").is_err());
        assert!(OverridePath::parse(".").is_err());
        assert!(OverridePath::parse("a.").is_err());
        assert!(OverridePath::parse(".a").is_err());
        assert!(OverridePath::parse("a..b").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for s in ["mapA", "mapA.device", "table.rows.r1.x"] {
            let path = OverridePath::parse(s).unwrap();
            assert_eq!(path.to_string(), s);
            assert_eq!(OverridePath::parse(&path.to_string()).unwrap(), path);
        }
    }

    #[test]
    fn test_with_item() {
        let id = ItemId::new("mapB").unwrap();
        let path = OverridePath::parse("mapA.device").unwrap().with_item(id);
        assert_eq!(path.to_string(), "mapB.device");
    }

    #[test]
    fn test_serde_as_string() {
        let path = OverridePath::parse("mapA.device").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"mapA.device\"");
        let back: OverridePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
