//! Built-in converters for common value conversions
//!
//! Copyright (c) 2025 Duomap Team
//! Licensed under the Apache-2.0 license

use super::converter::Converter;
use crate::value::is_truthy;
use anyhow::{anyhow, Context};
use serde_json::{Number, Value};

/// Every built-in converter
pub fn all() -> Vec<Converter> {
    vec![identity(), to_string(), to_number(), to_boolean(), always_true()]
}

/// Pass the value through unchanged
pub fn identity() -> Converter {
    Converter::infallible("identity", Value::clone)
}

/// Render scalars as strings; containers become their JSON text
pub fn to_string() -> Converter {
    Converter::infallible("to_string", |value| match value {
        Value::String(s) => Value::String(s.clone()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => Value::String(other.to_string()),
    })
}

/// Parse strings and booleans into numbers
pub fn to_number() -> Converter {
    Converter::new("to_number", |value| match value {
        Value::Number(n) => Ok(Value::Number(n.clone())),
        Value::Bool(b) => Ok(Value::from(u8::from(*b))),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::from(i));
            }
            let f = trimmed
                .parse::<f64>()
                .with_context(|| format!("'{}' is not a number", s))?;
            Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| anyhow!("'{}' is not a finite number", s))
        }
        other => Err(anyhow!("cannot convert {} to a number", other)),
    })
}

/// Truthiness of the value as a boolean
pub fn to_boolean() -> Converter {
    Converter::infallible("to_boolean", |value| Value::Bool(is_truthy(value)))
}

/// Ignore the value and produce `true`
pub fn always_true() -> Converter {
    Converter::infallible("always_true", |_| Value::Bool(true))
}
