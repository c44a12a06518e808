//! Mutable selection of values by mapping path
//!
//! Ignore and volatile fields in the corpus are written as mapping paths,
//! the same form rules use. A filter segment selects the first matching
//! element and a collection segment selects every matching element, so one
//! path can reach several values.

use duomap_core::{matches, matches_fields, Path, Segment};
use serde_json::Value;

/// Call `f` on every value `path` selects
pub fn for_each_mut(value: &mut Value, path: &Path, f: &mut dyn FnMut(&mut Value)) {
    walk(value, path.segments(), f);
}

/// Remove every value `path` selects
///
/// Removed mapping fields disappear; removed sequence elements are dropped
/// except for index segments, which are replaced by `null` so that later
/// indexes keep their meaning.
pub fn remove(value: &mut Value, path: &Path) {
    let Some((last, parent)) = path.segments().split_last() else {
        return;
    };
    walk(value, parent, &mut |container| remove_child(container, last));
}

fn walk(value: &mut Value, segments: &[Segment], f: &mut dyn FnMut(&mut Value)) {
    let Some((first, rest)) = segments.split_first() else {
        f(value);
        return;
    };

    match (first, value) {
        (Segment::Key(key), Value::Object(map)) => {
            if let Some(child) = map.get_mut(key) {
                walk(child, rest, f);
            }
        }
        (Segment::Index(index), Value::Array(items)) => {
            if let Some(child) = items.get_mut(*index) {
                walk(child, rest, f);
            }
        }
        (Segment::Index(index), Value::Object(map)) => {
            if let Some(child) = map.get_mut(&index.to_string()) {
                walk(child, rest, f);
            }
        }
        (Segment::Filter(pattern), Value::Array(items)) => {
            if let Some(child) = items.iter_mut().find(|item| matches_fields(pattern, item)) {
                walk(child, rest, f);
            }
        }
        (Segment::Collection { filter }, Value::Array(items)) => {
            for child in items
                .iter_mut()
                .filter(|item| filter.as_ref().map_or(true, |filter| matches(filter, item)))
            {
                walk(child, rest, f);
            }
        }
        _ => {}
    }
}

fn remove_child(container: &mut Value, segment: &Segment) {
    match (segment, container) {
        (Segment::Key(key), Value::Object(map)) => {
            map.remove(key);
        }
        (Segment::Index(index), Value::Array(items)) => {
            if let Some(item) = items.get_mut(*index) {
                *item = Value::Null;
            }
        }
        (Segment::Index(index), Value::Object(map)) => {
            map.remove(&index.to_string());
        }
        (Segment::Filter(pattern), Value::Array(items)) => {
            if let Some(position) = items.iter().position(|item| matches_fields(pattern, item)) {
                items.remove(position);
            }
        }
        (Segment::Collection { filter }, Value::Array(items)) => match filter {
            Some(filter) => items.retain(|item| !matches(filter, item)),
            None => items.clear(),
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(raw: Value) -> Path {
        Path::from_value(&raw).unwrap()
    }

    fn record() -> Value {
        json!({
            "id": "abc",
            "telecom": [
                {"system": "phone", "value": "1", "rank": 1},
                {"system": "email", "value": "e", "rank": 2},
                {"system": "phone", "value": "2", "rank": 3}
            ]
        })
    }

    #[test]
    fn test_remove_key() {
        let mut value = record();
        remove(&mut value, &path(json!(["id"])));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_remove_through_collection() {
        let mut value = record();
        remove(&mut value, &path(json!(["telecom", {"$collection": true}, "rank"])));
        assert!(value["telecom"]
            .as_array()
            .unwrap()
            .iter()
            .all(|item| item.get("rank").is_none()));
    }

    #[test]
    fn test_remove_filtered_element() {
        let mut value = record();
        remove(&mut value, &path(json!(["telecom", {"system": "email"}])));
        assert_eq!(value["telecom"].as_array().unwrap().len(), 2);

        remove(
            &mut value,
            &path(json!(["telecom", {"$collection": true, "$filter": {"system": "phone"}}])),
        );
        assert_eq!(value["telecom"], json!([]));
    }

    #[test]
    fn test_remove_index_keeps_positions() {
        let mut value = json!({"line": ["a", "b", "c"]});
        remove(&mut value, &path(json!(["line", 1])));
        assert_eq!(value, json!({"line": ["a", null, "c"]}));
    }

    #[test]
    fn test_index_on_mapping_selects_numeric_key() {
        let mut value = json!({"a": {"0": {"x": 1}, "b": 2}});
        let mut seen = Vec::new();
        for_each_mut(&mut value, &path(json!(["a", 0, "x"])), &mut |v| seen.push(v.clone()));
        assert_eq!(seen, vec![json!(1)]);

        remove(&mut value, &path(json!(["a", 0])));
        assert_eq!(value, json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_for_each_filter_selects_first() {
        let mut value = record();
        let mut seen = Vec::new();
        for_each_mut(&mut value, &path(json!(["telecom", {"system": "phone"}, "value"])), &mut |v| {
            seen.push(v.clone())
        });
        assert_eq!(seen, vec![json!("1")]);
    }

    #[test]
    fn test_missing_path_is_ignored() {
        let mut value = record();
        let before = value.clone();
        remove(&mut value, &path(json!(["nope", 0, "x"])));
        remove(&mut value, &path(json!([])));
        assert_eq!(value, before);
    }
}
