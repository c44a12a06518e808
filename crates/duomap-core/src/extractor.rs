//! Path-based extraction
//!
//! Reads a value out of a tree by walking a [`Path`] from left to right. The
//! walk short-circuits to `None` as soon as the cursor stops being present,
//! so a missing key, an unmatched filter, a `0` or an empty string anywhere
//! along the way all read as absence. Only shape errors, such as applying a
//! filter to a mapping, are reported as [`Error::UnsupportedPath`].

use crate::error::{Error, Result};
use crate::matcher::{find_first, matches};
use crate::path::{Path, Segment};
use crate::value::{is_present, kind_name};
use serde_json::Value;
use std::borrow::Cow;

/// Extract the value at `path`, cloning the result
///
/// # Example
///
/// ```
/// use duomap_core::{extract, Path};
/// use serde_json::json;
///
/// let data = json!({"a": {"b": [{"c": 2, "d": 3}, {"c": 1, "d": 2}]}});
/// let path = Path::from_value(&json!(["a", "b", {"c": 1}, "d"])).unwrap();
/// assert_eq!(extract(&data, &path).unwrap(), Some(json!(2)));
/// ```
pub fn extract(value: &Value, path: &Path) -> Result<Option<Value>> {
    Ok(extract_cow(value, path)?.map(Cow::into_owned))
}

/// Extract the value at `path`, borrowing from `value` where possible
///
/// Filtered collection segments build a new sequence, so the result is only
/// owned when such a segment was walked.
pub fn extract_cow<'a>(value: &'a Value, path: &Path) -> Result<Option<Cow<'a, Value>>> {
    let mut cursor: Cow<'a, Value> = Cow::Borrowed(value);

    for (position, segment) in path.segments().iter().enumerate() {
        cursor = match cursor {
            Cow::Borrowed(current) => match step(current, segment, position)? {
                Some(next) => next,
                None => return Ok(None),
            },
            Cow::Owned(current) => match step(&current, segment, position)? {
                Some(next) => Cow::Owned(next.into_owned()),
                None => return Ok(None),
            },
        };

        if !is_present(&cursor) {
            log::trace!("extraction of {} stopped at segment {}", path, position);
            return Ok(None);
        }
    }

    Ok(Some(cursor))
}

/// Apply a single segment to the cursor
fn step<'b>(cursor: &'b Value, segment: &Segment, position: usize) -> Result<Option<Cow<'b, Value>>> {
    match segment {
        Segment::Key(key) => match cursor {
            Value::Object(map) => Ok(map.get(key).map(Cow::Borrowed)),
            Value::Array(_) => Ok(None),
            other => Err(Error::unsupported_path(
                format!("cannot read a key from a {}", kind_name(other)),
                segment.to_string(),
                position,
            )),
        },
        Segment::Index(index) => match cursor {
            Value::Array(items) => Ok(items.get(*index).map(Cow::Borrowed)),
            Value::Object(map) => Ok(map.get(&index.to_string()).map(Cow::Borrowed)),
            other => Err(Error::unsupported_path(
                format!("cannot read an index from a {}", kind_name(other)),
                segment.to_string(),
                position,
            )),
        },
        Segment::Filter(pattern) => {
            let items = expect_sequence(cursor, segment, position)?;
            Ok(find_first(pattern, items).map(Cow::Borrowed))
        }
        Segment::Collection { filter } => {
            let items = expect_sequence(cursor, segment, position)?;
            match filter {
                Some(filter) => Ok(Some(Cow::Owned(Value::Array(
                    items.iter().filter(|item| matches(filter, item)).cloned().collect(),
                )))),
                None => Ok(Some(Cow::Borrowed(cursor))),
            }
        }
    }
}

fn expect_sequence<'b>(cursor: &'b Value, segment: &Segment, position: usize) -> Result<&'b [Value]> {
    cursor.as_array().map(Vec::as_slice).ok_or_else(|| {
        Error::unsupported_path(
            format!("filter segments require a sequence, found a {}", kind_name(cursor)),
            segment.to_string(),
            position,
        )
    })
}
