//! Property-based testing strategies for generating test data
//!
//! These strategies generate JSON trees and paths whose keys are drawn from a
//! small alphabet so that generated paths actually hit generated data.

#![cfg(test)]

use crate::path::{Path, Segment};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strategy for short field names shared by data and paths
pub fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]"
}

/// Strategy for scalars that count as present
pub fn present_scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Bool(true)),
        Just(Value::Bool(false)),
        (1i64..1000).prop_map(Value::from),
        "[a-z]{1,8}".prop_map(Value::String),
    ]
}

/// Strategy for arbitrary scalars, absent ones included
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::from(0)),
        Just(Value::String(String::new())),
        present_scalar_strategy(),
    ]
}

/// Strategy for arbitrary JSON trees of bounded depth
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(Value::Array),
            btree_map(key_strategy(), inner, 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Strategy for flat mapping patterns usable in filter segments
///
/// Pattern keys never collide with [`key_strategy`] keys.
pub fn pattern_strategy() -> impl Strategy<Value = Map<String, Value>> {
    btree_map("[p-r]", present_scalar_strategy(), 1..3).prop_map(|fields| fields.into_iter().collect())
}

/// Strategy for a run of segments that can follow a key or index
fn step_strategy() -> impl Strategy<Value = Vec<Segment>> {
    prop_oneof![
        3 => key_strategy().prop_map(|key| vec![Segment::Key(key)]),
        1 => (0usize..3).prop_map(|index| vec![Segment::Index(index)]),
        1 => (pattern_strategy(), key_strategy())
            .prop_map(|(pattern, key)| vec![Segment::Filter(pattern), Segment::Key(key)]),
    ]
}

/// Strategy for paths that can be written into an empty mapping
///
/// Paths start and end with a key and every filter is followed by a key, so
/// each created container has the shape the next segment expects.
pub fn writable_path_strategy() -> impl Strategy<Value = Path> {
    (key_strategy(), vec(step_strategy(), 0..4), key_strategy()).prop_map(|(first, steps, last)| {
        std::iter::once(Segment::Key(first))
            .chain(steps.into_iter().flatten())
            .chain(std::iter::once(Segment::Key(last)))
            .collect()
    })
}

/// Strategy for scalars that count as truthy
pub fn truthy_scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Bool(true)),
        (1i64..1000).prop_map(Value::from),
        "[a-z]{1,8}".prop_map(Value::String),
    ]
}
