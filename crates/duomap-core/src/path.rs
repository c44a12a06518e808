//! Path segments for navigating and constructing value trees
//!
//! A [`Path`] is an ordered list of [`Segment`]s. In rule documents a path is
//! written as a JSON array whose items are interpreted by shape:
//!
//! - a string is a [`Segment::Key`]
//! - a non-negative integer is a [`Segment::Index`]
//! - an object with a truthy `$collection` is a [`Segment::Collection`],
//!   optionally narrowed by its `$filter` pattern
//! - any other object is a [`Segment::Filter`] pattern
//!
//! ```
//! use duomap_core::path::{Path, Segment};
//! use serde_json::json;
//!
//! let path = Path::from_value(&json!(["telecom", {"system": "phone"}, "value"])).unwrap();
//! assert_eq!(path.len(), 3);
//! assert!(matches!(path.segments()[1], Segment::Filter(_)));
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Marker key identifying a whole-collection segment
pub const COLLECTION_KEY: &str = "$collection";
/// Key holding the optional pattern of a collection segment
pub const FILTER_KEY: &str = "$filter";

/// A single step of a [`Path`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Segment {
    /// Field of a keyed mapping
    Key(String),
    /// Position in a sequence
    Index(usize),
    /// First sequence element matching the pattern
    Filter(Map<String, Value>),
    /// The whole sequence, optionally narrowed to matching elements
    Collection { filter: Option<Value> },
}

impl Segment {
    /// Parse one segment from its document form
    pub fn from_value(value: &Value, position: usize) -> Result<Self> {
        match value {
            Value::String(key) => Ok(Segment::Key(key.clone())),
            Value::Number(n) => n
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .map(Segment::Index)
                .ok_or_else(|| {
                    Error::unsupported_path(
                        "index segments must be non-negative integers that fit in usize",
                        value.to_string(),
                        position,
                    )
                }),
            Value::Object(map) => {
                let is_collection = map
                    .get(COLLECTION_KEY)
                    .map(crate::value::is_truthy)
                    .unwrap_or(false);
                if is_collection {
                    Ok(Segment::Collection {
                        filter: map.get(FILTER_KEY).filter(|f| !f.is_null()).cloned(),
                    })
                } else {
                    Ok(Segment::Filter(map.clone()))
                }
            }
            _ => Err(Error::unsupported_path(
                format!("{} cannot be used as a path segment", crate::value::kind_name(value)),
                value.to_string(),
                position,
            )),
        }
    }

    /// Document form of this segment
    pub fn to_value(&self) -> Value {
        match self {
            Segment::Key(key) => Value::String(key.clone()),
            Segment::Index(i) => Value::from(*i),
            Segment::Filter(pattern) => Value::Object(pattern.clone()),
            Segment::Collection { filter } => {
                let mut map = Map::new();
                map.insert(COLLECTION_KEY.to_string(), Value::Bool(true));
                if let Some(filter) = filter {
                    map.insert(FILTER_KEY.to_string(), filter.clone());
                }
                Value::Object(map)
            }
        }
    }

    /// Whether this segment addresses a whole collection
    pub fn is_collection(&self) -> bool {
        matches!(self, Segment::Collection { .. })
    }

    /// The `$filter` pattern of a collection segment, if any
    pub fn collection_filter(&self) -> Option<&Value> {
        match self {
            Segment::Collection { filter } => filter.as_ref(),
            _ => None,
        }
    }
}

impl TryFrom<Value> for Segment {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Segment::from_value(&value, 0)
    }
}

impl From<Segment> for Value {
    fn from(segment: Segment) -> Self {
        segment.to_value()
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

/// An ordered list of segments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Segment>);

impl Path {
    /// Create an empty path
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse a path from its JSON array form
    pub fn from_value(value: &Value) -> Result<Self> {
        let items = value.as_array().ok_or_else(|| {
            Error::unsupported_path("a path must be a sequence of segments", value.to_string(), 0)
        })?;

        items
            .iter()
            .enumerate()
            .map(|(position, item)| Segment::from_value(item, position))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// JSON array form of this path
    pub fn to_value(&self) -> Value {
        Value::Array(self.0.iter().map(Segment::to_value).collect())
    }

    /// Append a key segment
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(Segment::Key(key.into()));
        self
    }

    /// Append an index segment
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }

    /// Append a filter segment; non-object patterns are ignored
    pub fn filter(mut self, pattern: Value) -> Self {
        if let Value::Object(map) = pattern {
            self.0.push(Segment::Filter(map));
        }
        self
    }

    /// Append a whole-collection segment
    pub fn collection(mut self, filter: Option<Value>) -> Self {
        self.0.push(Segment::Collection { filter });
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl TryFrom<Value> for Path {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Path::from_value(&value)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
