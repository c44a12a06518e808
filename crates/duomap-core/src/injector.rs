//! Path-based injection
//!
//! Writes a payload into a tree by walking a [`Path`], creating whatever
//! intermediate structure is missing. The shape of a created container is
//! chosen by looking one segment ahead: an index or filter next means a
//! sequence, a key next means a mapping. Filter segments upsert: the first
//! matching sequence element is reused, otherwise a new element seeded from
//! the filter's fields is appended.
//!
//! An index segment on a mapping addresses the field named by the index's
//! decimal form. Padding a sequence up to an index is capped at
//! [`MAX_INDEX_PADDING`] entries.
//!
//! Existing truthy values are never overwritten. Falsy slots (`null`, `false`,
//! `0`, `""`) are treated as empty and replaced.

use crate::error::{Error, Result};
use crate::matcher::position_first;
use crate::path::{Path, Segment};
use crate::value::{is_truthy, kind_name};
use serde_json::{Map, Value};

/// Most `null` entries a single index write may pad a sequence with
pub const MAX_INDEX_PADDING: usize = 4096;

/// Result of an in-place injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    /// The payload was stored in the tree
    Written,
    /// The path ended on an existing value; the payload was discarded
    Unchanged,
    /// The walk reached a falsy cursor and stopped
    DeadEnd,
}

impl InjectOutcome {
    pub fn is_dead_end(self) -> bool {
        self == InjectOutcome::DeadEnd
    }
}

/// Inject `payload` at `path` into an owned target, returning the target
///
/// Returns `Ok(None)` when the walk hits a dead end.
///
/// # Example
///
/// ```
/// use duomap_core::{inject, Path};
/// use serde_json::json;
///
/// let path = Path::from_value(&json!(["telecom", {"system": "phone"}, "value"])).unwrap();
/// let out = inject(json!({}), &path, json!("555")).unwrap();
/// assert_eq!(out, Some(json!({"telecom": [{"system": "phone", "value": "555"}]})));
/// ```
pub fn inject(mut target: Value, path: &Path, payload: Value) -> Result<Option<Value>> {
    match inject_in_place(&mut target, path, payload)? {
        InjectOutcome::DeadEnd => Ok(None),
        _ => Ok(Some(target)),
    }
}

/// Inject `payload` at `path`, mutating `target` in place
pub fn inject_in_place(target: &mut Value, path: &Path, payload: Value) -> Result<InjectOutcome> {
    let segments = path.segments();
    let mut payload = Some(payload);
    let mut cursor: &mut Value = target;

    for (position, segment) in segments.iter().enumerate() {
        let next = segments.get(position + 1);

        match segment {
            Segment::Collection { .. } => {
                let items = expect_sequence(cursor, segment, position)?;
                if next.is_some() {
                    return Err(Error::unsupported_path(
                        "a collection segment must be the last segment when injecting",
                        segment.to_string(),
                        position,
                    ));
                }
                return match payload.take() {
                    Some(Value::Array(values)) => {
                        items.extend(values);
                        Ok(InjectOutcome::Written)
                    }
                    other => Err(Error::unsupported_path(
                        format!(
                            "collection injection requires a sequence payload, found a {}",
                            other.as_ref().map(kind_name).unwrap_or("null")
                        ),
                        segment.to_string(),
                        position,
                    )),
                };
            }
            Segment::Filter(pattern) => {
                let items = expect_sequence(cursor, segment, position)?;
                let index = match position_first(pattern, items) {
                    Some(index) => index,
                    None => {
                        items.push(seed(pattern));
                        items.len() - 1
                    }
                };
                cursor = &mut items[index];
            }
            Segment::Key(key) => {
                let map = match cursor {
                    Value::Object(map) => map,
                    other => {
                        return Err(Error::unsupported_path(
                            format!("cannot write a key into a {}", kind_name(other)),
                            segment.to_string(),
                            position,
                        ))
                    }
                };
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                if fill_slot(slot, next, &mut payload) {
                    return Ok(InjectOutcome::Written);
                }
                cursor = slot;
            }
            Segment::Index(index) => {
                let slot = match cursor {
                    Value::Array(items) => {
                        pad_to(items, *index, segment, position)?;
                        &mut items[*index]
                    }
                    Value::Object(map) => map.entry(index.to_string()).or_insert(Value::Null),
                    other => {
                        return Err(Error::unsupported_path(
                            format!("cannot write an index into a {}", kind_name(other)),
                            segment.to_string(),
                            position,
                        ))
                    }
                };
                if fill_slot(slot, next, &mut payload) {
                    return Ok(InjectOutcome::Written);
                }
                cursor = slot;
            }
        }

        if !is_truthy(cursor) {
            log::debug!("injection into {} reached a dead end at segment {}", path, position);
            return Ok(InjectOutcome::DeadEnd);
        }
    }

    Ok(InjectOutcome::Unchanged)
}

/// Fill an empty slot based on the next segment
///
/// Returns `true` when the payload was stored and the walk is finished.
fn fill_slot(slot: &mut Value, next: Option<&Segment>, payload: &mut Option<Value>) -> bool {
    if is_truthy(slot) {
        return false;
    }

    match next {
        Some(Segment::Collection { .. }) | None => {
            *slot = payload.take().unwrap_or_default();
            true
        }
        Some(Segment::Index(_)) | Some(Segment::Filter(_)) => {
            *slot = Value::Array(Vec::new());
            false
        }
        Some(Segment::Key(_)) => {
            *slot = Value::Object(Map::new());
            false
        }
    }
}

/// Grow `items` with `null` so that `index` is a valid position
fn pad_to(items: &mut Vec<Value>, index: usize, segment: &Segment, position: usize) -> Result<()> {
    if index < items.len() {
        return Ok(());
    }
    let gap = index - items.len();
    if gap >= MAX_INDEX_PADDING {
        return Err(Error::unsupported_path(
            format!(
                "index {} would pad a sequence of {} with more than {} nulls",
                index,
                items.len(),
                MAX_INDEX_PADDING
            ),
            segment.to_string(),
            position,
        ));
    }
    items.resize(index + 1, Value::Null);
    Ok(())
}

/// New sequence element seeded with the filter's top-level fields
fn seed(pattern: &Map<String, Value>) -> Value {
    Value::Object(pattern.clone())
}

fn expect_sequence<'b>(
    cursor: &'b mut Value,
    segment: &Segment,
    position: usize,
) -> Result<&'b mut Vec<Value>> {
    match cursor {
        Value::Array(items) => Ok(items),
        other => Err(Error::unsupported_path(
            format!("filter segments require a sequence, found a {}", kind_name(other)),
            segment.to_string(),
            position,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(raw: Value) -> Path {
        Path::from_value(&raw).unwrap()
    }

    #[test]
    fn test_creates_mappings_for_keys() {
        let out = inject(json!({}), &path(json!(["x", "y"])), json!(true)).unwrap();
        assert_eq!(out, Some(json!({"x": {"y": true}})));
    }

    #[test]
    fn test_creates_sequences_for_indices() {
        let out = inject(json!({}), &path(json!(["name", 0, "family", 0])), json!("Last")).unwrap();
        assert_eq!(out, Some(json!({"name": [{"family": ["Last"]}]})));
    }

    #[test]
    fn test_index_past_end_pads_with_null() {
        let out = inject(json!({}), &path(json!(["line", 2])), json!("c")).unwrap();
        assert_eq!(out, Some(json!({"line": [null, null, "c"]})));
    }

    #[test]
    fn test_index_far_past_end_is_rejected() {
        let err = inject(json!({}), &path(json!(["a", u64::MAX])), json!("x")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPath { position: 1, .. }));

        let err = inject(json!({"a": [1]}), &path(json!(["a", 1 + MAX_INDEX_PADDING])), json!("x")).unwrap_err();
        assert!(err.is_unsupported_path());
    }

    #[test]
    fn test_index_padding_up_to_cap() {
        let out = inject(json!({}), &path(json!(["a", MAX_INDEX_PADDING - 1])), json!("x"))
            .unwrap()
            .unwrap();
        let items = out["a"].as_array().unwrap();
        assert_eq!(items.len(), MAX_INDEX_PADDING);
        assert_eq!(items[MAX_INDEX_PADDING - 1], json!("x"));
    }

    #[test]
    fn test_index_on_mapping_writes_numeric_key() {
        let mut target = json!({"a": {"b": "x"}});
        let outcome = inject_in_place(&mut target, &path(json!(["a", 0])), json!("y")).unwrap();
        assert_eq!(outcome, InjectOutcome::Written);
        assert_eq!(target, json!({"a": {"b": "x", "0": "y"}}));

        let outcome = inject_in_place(&mut target, &path(json!(["a", 1, "c"])), json!(1)).unwrap();
        assert_eq!(outcome, InjectOutcome::Written);
        assert_eq!(target, json!({"a": {"b": "x", "0": "y", "1": {"c": 1}}}));
    }

    #[test]
    fn test_second_index_appends_to_existing_sequence() {
        let mut target = json!({});
        inject_in_place(&mut target, &path(json!(["address", {"use": "work"}, "line", 0])), json!("a1")).unwrap();
        inject_in_place(&mut target, &path(json!(["address", {"use": "work"}, "line", 1])), json!("a2")).unwrap();
        assert_eq!(target, json!({"address": [{"use": "work", "line": ["a1", "a2"]}]}));
    }

    #[test]
    fn test_filter_seeds_new_element() {
        let out = inject(json!({}), &path(json!(["telecom", {"system": "phone"}, "value"])), json!("1")).unwrap();
        assert_eq!(out, Some(json!({"telecom": [{"system": "phone", "value": "1"}]})));
    }

    #[test]
    fn test_filter_upsert_is_idempotent() {
        let p = path(json!(["telecom", {"system": "phone"}, "value"]));
        let mut target = json!({});
        assert_eq!(inject_in_place(&mut target, &p, json!("1")).unwrap(), InjectOutcome::Written);
        assert_eq!(inject_in_place(&mut target, &p, json!("1")).unwrap(), InjectOutcome::Unchanged);
        assert_eq!(target, json!({"telecom": [{"system": "phone", "value": "1"}]}));
    }

    #[test]
    fn test_filter_reuses_matching_element() {
        let mut target = json!({"telecom": [{"system": "email", "value": "e"}, {"system": "phone"}]});
        inject_in_place(&mut target, &path(json!(["telecom", {"system": "phone"}, "value"])), json!("1")).unwrap();
        assert_eq!(
            target,
            json!({"telecom": [{"system": "email", "value": "e"}, {"system": "phone", "value": "1"}]})
        );
    }

    #[test]
    fn test_existing_value_not_overwritten() {
        let mut target = json!({"a": {"b": "keep"}});
        let outcome = inject_in_place(&mut target, &path(json!(["a", "b"])), json!("new")).unwrap();
        assert_eq!(outcome, InjectOutcome::Unchanged);
        assert_eq!(target, json!({"a": {"b": "keep"}}));
    }

    #[test]
    fn test_falsy_slot_is_replaced() {
        let mut target = json!({"a": "", "b": 0, "c": null});
        inject_in_place(&mut target, &path(json!(["a"])), json!("x")).unwrap();
        inject_in_place(&mut target, &path(json!(["b"])), json!(2)).unwrap();
        inject_in_place(&mut target, &path(json!(["c", "d"])), json!(3)).unwrap();
        assert_eq!(target, json!({"a": "x", "b": 2, "c": {"d": 3}}));
    }

    #[test]
    fn test_collection_lookahead_assigns_payload() {
        let out = inject(
            json!({}),
            &path(json!(["phones", {"$collection": true}])),
            json!([{"number": "1"}]),
        )
        .unwrap();
        assert_eq!(out, Some(json!({"phones": [{"number": "1"}]})));
    }

    #[test]
    fn test_collection_appends_to_existing_sequence() {
        let out = inject(
            json!({"phones": [{"number": "1"}]}),
            &path(json!(["phones", {"$collection": true}])),
            json!([{"number": "2"}, {"number": "3"}]),
        )
        .unwrap();
        assert_eq!(out, Some(json!({"phones": [{"number": "1"}, {"number": "2"}, {"number": "3"}]})));
    }

    #[test]
    fn test_collection_requires_sequence_payload() {
        let err = inject(
            json!({"phones": []}),
            &path(json!(["phones", {"$collection": true}])),
            json!("1"),
        )
        .unwrap_err();
        assert!(err.is_unsupported_path());
    }

    #[test]
    fn test_collection_must_be_last() {
        let err = inject(
            json!({"phones": []}),
            &path(json!(["phones", {"$collection": true}, "number"])),
            json!(["1"]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedPath { position: 1, .. }));
    }

    #[test]
    fn test_filter_on_mapping_is_unsupported() {
        let err = inject(
            json!({"telecom": {}}),
            &path(json!(["telecom", {"system": "phone"}, "value"])),
            json!("1"),
        )
        .unwrap_err();
        assert!(err.is_unsupported_path());
    }

    #[test]
    fn test_key_into_scalar_is_unsupported() {
        let err = inject(json!({"a": "text"}), &path(json!(["a", "b"])), json!(1)).unwrap_err();
        assert!(err.is_unsupported_path());
    }

    #[test]
    fn test_key_into_sequence_is_unsupported() {
        let err = inject(json!({"a": [1]}), &path(json!(["a", "b"])), json!(1)).unwrap_err();
        assert!(err.is_unsupported_path());
    }

    #[test]
    fn test_empty_path_leaves_target() {
        let out = inject(json!({"a": 1}), &Path::new(), json!(2)).unwrap();
        assert_eq!(out, Some(json!({"a": 1})));
    }
}
