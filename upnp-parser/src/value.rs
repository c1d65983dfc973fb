//! Nested mapping produced from a description document.

use serde::Serialize;
use std::collections::BTreeMap;

/// Children of an element, keyed by local tag name.
pub type Mapping = BTreeMap<String, Value>;

/// One node of a parsed document.
///
/// Leaf elements carry their text, elements with child elements carry a
/// [`Mapping`] of those children. Attributes are not represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Leaf element without any text, e.g. `<presentationURL/>`
    Empty,
    /// Leaf element text, trimmed and unescaped
    Text(String),
    /// Element with child elements
    Map(Mapping),
}

impl Value {
    /// Text content of a leaf, `None` for empty leaves and mappings
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Child mapping, `None` for leaves
    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Map(map)
    }
}
