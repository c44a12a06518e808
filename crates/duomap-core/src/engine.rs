//! Rule-driven transform engine
//!
//! [`transform`] makes a single left-to-right pass over a rule list. For each
//! rule that has a path in the target direction it resolves a value, either by
//! extracting from the source, taking the rule's constant, or reading a
//! `calculate` path from the output built so far. The value is then converted,
//! mapped item-by-item through nested rules when the rule has any, and
//! injected into the output.
//!
//! The output is owned by the call and only handed back when every rule
//! succeeded; a failing rule discards it.
//!
//! Copyright (c) 2025 Duomap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::extractor::extract;
use crate::injector::inject_in_place;
use crate::path::Path;
use crate::rules::{Direction, MappingRule, RuleSet};
use crate::value::{is_present, kind_name};
use serde_json::{Map, Value};

/// Transform `source` from `direction.from` into `direction.to`
///
/// # Example
///
/// ```
/// use duomap_core::{transform, Direction, MappingRuleBuilder};
/// use serde_json::json;
///
/// let rules = vec![
///     MappingRuleBuilder::new()
///         .path("target", json!(["x", "y"]))
///         .constant("target", json!(true))
///         .build()
///         .unwrap(),
/// ];
/// let out = transform(&json!({}), &rules, &Direction::new("source", "target")).unwrap();
/// assert_eq!(out, json!({"x": {"y": true}}));
/// ```
pub fn transform(source: &Value, rules: &[MappingRule], direction: &Direction) -> Result<Value> {
    let span = tracing::debug_span!(
        "transform",
        from = %direction.from,
        to = %direction.to,
        rules = rules.len()
    );
    let _enter = span.enter();

    let mut output = Value::Object(Map::new());
    for rule in rules {
        apply_rule(source, rule, direction, &mut output)?;
    }
    Ok(output)
}

/// Apply one rule to the output under construction
fn apply_rule(
    source: &Value,
    rule: &MappingRule,
    direction: &Direction,
    output: &mut Value,
) -> Result<()> {
    let Some(to_path) = rule.path(&direction.to) else {
        log::trace!("Rule '{}' has no '{}' path, skipping", rule.label(), direction.to);
        return Ok(());
    };

    let value = match (resolve(source, rule, direction, output)?, rule.converter(&direction.to)) {
        (Some(value), Some(converter)) if is_present(&value) => Some(converter.apply(&value)?),
        (value, _) => value,
    };

    match value.filter(is_present) {
        Some(value) => {
            let payload = match &rule.nested {
                Some(nested) => map_items(value, nested, direction, to_path)?,
                None => value,
            };
            if inject_in_place(output, to_path, payload)?.is_dead_end() {
                log::debug!("Rule '{}' could not be injected at {}", rule.label(), to_path);
            }
            Ok(())
        }
        None if rule.required => {
            log::warn!("Required rule '{}' resolved to nothing ({})", rule.label(), direction);
            Err(Error::RequiredField {
                rule: rule.to_value(),
                source_value: source.clone(),
            })
        }
        None => Ok(()),
    }
}

/// Resolve a rule's value: source path, then constant, then calculated path
fn resolve(
    source: &Value,
    rule: &MappingRule,
    direction: &Direction,
    output: &Value,
) -> Result<Option<Value>> {
    if let Some(from_path) = rule.path(&direction.from) {
        return extract(source, from_path);
    }
    if let Some(constant) = rule.constant(&direction.to).filter(|c| is_present(c)) {
        return Ok(Some(constant.clone()));
    }
    if let Some(calculate) = &rule.calculate {
        return extract(output, calculate);
    }
    Ok(None)
}

/// Transform every item of a collection value through nested rules
///
/// When the target path ends in a collection segment with a `$filter`, the
/// filter's fields are stamped onto each produced item so the items match
/// that filter when read back.
fn map_items(value: Value, nested: &[MappingRule], direction: &Direction, to_path: &Path) -> Result<Value> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(Error::CollectionExpected {
                found: kind_name(&other).to_string(),
            })
        }
    };

    let stamp = to_path
        .last()
        .and_then(|segment| segment.collection_filter())
        .and_then(Value::as_object);

    items
        .iter()
        .map(|item| {
            let mut mapped = transform(item, nested, direction)?;
            if let (Some(stamp), Value::Object(fields)) = (stamp, &mut mapped) {
                for (key, field) in stamp {
                    fields.insert(key.clone(), field.clone());
                }
            }
            Ok(mapped)
        })
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

/// A named rule set bound to a default direction
#[derive(Debug, Clone)]
pub struct Mapper {
    name: String,
    rules: RuleSet,
    direction: Direction,
}

impl Mapper {
    pub fn new(name: impl Into<String>, rules: RuleSet, direction: Direction) -> Self {
        Self {
            name: name.into(),
            rules,
            direction,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn direction(&self) -> &Direction {
        &self.direction
    }

    /// Transform along the default direction
    pub fn forward(&self, source: &Value) -> Result<Value> {
        self.transform(source, &self.direction)
    }

    /// Transform against the default direction
    pub fn reverse(&self, source: &Value) -> Result<Value> {
        self.transform(source, &self.direction.reversed())
    }

    /// Transform along an explicit direction
    pub fn transform(&self, source: &Value, direction: &Direction) -> Result<Value> {
        transform(source, self.rules.rules(), direction)
    }

    /// Forward then reverse, returning both results
    pub fn round_trip(&self, source: &Value) -> Result<(Value, Value)> {
        let there = self.forward(source)?;
        let back = self.reverse(&there)?;
        Ok((there, back))
    }
}
