//! Presence and equality rules over JSON value trees
//!
//! Mapping documents are authored against loosely-typed records, so a value
//! counts as *present* when it is truthy or is the literal `false`. Under this
//! rule `null`, `0` and `""` are absent while `false`, empty sequences and
//! empty mappings are present.

use serde_json::Value;

/// Whether `value` is truthy: everything except `null`, `false`, zero and `""`
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether `value` is present: truthy, or exactly `false`
pub fn is_present(value: &Value) -> bool {
    is_truthy(value) || matches!(value, Value::Bool(false))
}

/// Presence check for an optional value
pub fn is_present_opt(value: Option<&Value>) -> bool {
    value.map(is_present).unwrap_or(false)
}

/// Strict scalar equality; numbers compare by numeric value
pub fn scalars_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
                x == y
            } else {
                a.as_f64() == b.as_f64()
            }
        }
        _ => left == right,
    }
}

/// Short name of a value's shape, for diagnostics
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
