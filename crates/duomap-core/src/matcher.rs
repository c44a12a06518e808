//! Structural partial matching
//!
//! A pattern matches a candidate when every entry present in the pattern is
//! found, recursively, at the same place in the candidate. Entries the pattern
//! does not mention are never inspected, so `{}` matches every mapping and
//! `[]` matches every sequence.

use crate::value::scalars_equal;
use serde_json::{Map, Value};

/// Whether `pattern` structurally matches `candidate`
pub fn matches(pattern: &Value, candidate: &Value) -> bool {
    match pattern {
        Value::Array(items) => match candidate {
            Value::Array(candidates) => items
                .iter()
                .enumerate()
                .all(|(i, item)| candidates.get(i).is_some_and(|c| matches(item, c))),
            _ => false,
        },
        Value::Object(fields) => matches_fields(fields, candidate),
        _ => scalars_equal(pattern, candidate),
    }
}

/// Whether `candidate` is a mapping carrying every entry of `fields`
///
/// Filter segments store their pattern as a bare map and match through here.
pub fn matches_fields(fields: &Map<String, Value>, candidate: &Value) -> bool {
    match candidate {
        Value::Object(candidates) => fields
            .iter()
            .all(|(key, field)| candidates.get(key).is_some_and(|c| matches(field, c))),
        _ => false,
    }
}

/// First element of `items` carrying every entry of `fields`
pub fn find_first<'a>(fields: &Map<String, Value>, items: &'a [Value]) -> Option<&'a Value> {
    items.iter().find(|item| matches_fields(fields, item))
}

/// Position of the first element of `items` carrying every entry of `fields`
pub fn position_first(fields: &Map<String, Value>, items: &[Value]) -> Option<usize> {
    items.iter().position(|item| matches_fields(fields, item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_equality() {
        assert!(matches(&json!("phone"), &json!("phone")));
        assert!(!matches(&json!("phone"), &json!("email")));
        assert!(!matches(&json!(1), &json!("1")));
        assert!(matches(&json!(null), &json!(null)));
        assert!(matches(&json!(2), &json!(2.0)));
    }

    #[test]
    fn test_mapping_partial_match() {
        let candidate = json!({"system": "phone", "value": "111", "use": "work"});
        assert!(matches(&json!({"system": "phone"}), &candidate));
        assert!(matches(&json!({}), &candidate));
        assert!(!matches(&json!({"system": "email"}), &candidate));
        assert!(!matches(&json!({"rank": 1}), &candidate));
    }

    #[test]
    fn test_nested_mapping_match() {
        let candidate = json!({"code": {"coding": [{"system": "x", "code": "1"}], "text": "t"}});
        assert!(matches(&json!({"code": {"coding": [{"system": "x"}]}}), &candidate));
        assert!(!matches(&json!({"code": {"coding": [{"system": "y"}]}}), &candidate));
    }

    #[test]
    fn test_sequence_index_aligned() {
        assert!(matches(&json!([1, 2]), &json!([1, 2, 3])));
        assert!(!matches(&json!([2, 1]), &json!([1, 2])));
        assert!(!matches(&json!([1, 2, 3]), &json!([1, 2])));
        assert!(matches(&json!([]), &json!([9, 8])));
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(!matches(&json!({}), &json!([])));
        assert!(!matches(&json!([]), &json!({})));
        assert!(!matches(&json!({"a": 1}), &json!(null)));
        assert!(!matches(&json!("a"), &json!({"a": 1})));
    }

    fn fields(raw: Value) -> Map<String, Value> {
        raw.as_object().cloned().unwrap()
    }

    #[test]
    fn test_find_first() {
        let items = vec![json!({"c": 2, "d": 3}), json!({"c": 1, "d": 2}), json!({"c": 1, "d": 5})];
        assert_eq!(find_first(&fields(json!({"c": 1})), &items), Some(&items[1]));
        assert_eq!(position_first(&fields(json!({"c": 1})), &items), Some(1));
        assert_eq!(find_first(&fields(json!({"c": 7})), &items), None);
    }

    #[test]
    fn test_matches_fields_agrees_with_matches() {
        let candidate = json!({"system": "phone", "value": "1"});
        assert!(matches_fields(&fields(json!({"system": "phone"})), &candidate));
        assert!(!matches_fields(&fields(json!({"system": "email"})), &candidate));
        assert!(matches_fields(&Map::new(), &candidate));
        assert!(!matches_fields(&Map::new(), &json!([candidate])));
    }
}
