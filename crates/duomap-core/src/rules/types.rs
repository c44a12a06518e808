//! Core types for mapping rules
//!
//! A [`MappingRule`] describes one field in every representation it knows
//! about. The same rule is read in both directions: for a transform from `A`
//! to `B` the rule's `A` path is extracted and its `B` path is injected.
//!
//! In documents a rule is a JSON object whose keys are interpreted as:
//!
//! | key               | meaning                                          |
//! |-------------------|--------------------------------------------------|
//! | `<direction>`     | path into that representation                    |
//! | `<direction>_const` | literal used when the source path is missing   |
//! | `to_<direction>`  | name of a converter applied before injecting     |
//! | `calculate`       | path read from the output built so far           |
//! | `required`        | fail when the value resolves to absent           |
//! | `$mapping`        | rules applied to each item of a collection value |
//! | `id`              | optional label used in diagnostics               |
//!
//! Copyright (c) 2025 Duomap Team
//! Licensed under the Apache-2.0 license

use super::converter::{Converter, ConverterRegistry};
use crate::error::{Error, Result};
use crate::path::Path;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const NESTED_KEY: &str = "$mapping";
pub const CALCULATE_KEY: &str = "calculate";
pub const REQUIRED_KEY: &str = "required";
pub const ID_KEY: &str = "id";
pub const CONST_SUFFIX: &str = "_const";
pub const CONVERTER_PREFIX: &str = "to_";

/// The ordered pair of representation names a transform converts between
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Direction {
    pub from: String,
    pub to: String,
}

impl Direction {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The opposite direction
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for Direction {
    fn from((from, to): (A, B)) -> Self {
        Self::new(from, to)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A single bidirectional mapping rule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingRule {
    /// Optional label used in diagnostics
    pub id: Option<String>,
    /// Path per direction name
    pub paths: BTreeMap<String, Path>,
    /// Constant per direction name, used when the source path is missing
    pub constants: BTreeMap<String, Value>,
    /// Converter applied before injecting into a direction
    pub converters: BTreeMap<String, Converter>,
    /// Path evaluated against the output built so far
    pub calculate: Option<Path>,
    /// Fail instead of skipping when the value resolves to absent
    pub required: bool,
    /// Rules applied to each item of a collection value
    pub nested: Option<Vec<MappingRule>>,
}

impl MappingRule {
    pub fn path(&self, direction: &str) -> Option<&Path> {
        self.paths.get(direction)
    }

    pub fn constant(&self, direction: &str) -> Option<&Value> {
        self.constants.get(direction)
    }

    pub fn converter(&self, direction: &str) -> Option<&Converter> {
        self.converters.get(direction)
    }

    /// Label for log messages
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => self
                .paths
                .iter()
                .map(|(direction, path)| format!("{}={}", direction, path))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Parse a rule from its document form, resolving converter names
    pub fn from_value(value: &Value, registry: &ConverterRegistry, index: usize) -> Result<Self> {
        let fields = value
            .as_object()
            .ok_or_else(|| Error::invalid_rule("a rule must be a mapping", Some(index)))?;

        let mut rule = MappingRule::default();

        for (key, field) in fields {
            match key.as_str() {
                NESTED_KEY => {
                    let nested = parse_rule_list(field, registry).map_err(|e| {
                        Error::invalid_rule(format!("in {}: {}", NESTED_KEY, e), Some(index))
                    })?;
                    rule.nested = Some(nested);
                }
                CALCULATE_KEY => {
                    rule.calculate = Some(parse_path(field, key, index)?);
                }
                REQUIRED_KEY => {
                    rule.required = field.as_bool().ok_or_else(|| {
                        Error::invalid_rule("'required' must be a boolean", Some(index))
                    })?;
                }
                ID_KEY => {
                    let id = field
                        .as_str()
                        .ok_or_else(|| Error::invalid_rule("'id' must be a string", Some(index)))?;
                    rule.id = Some(id.to_string());
                }
                _ if key.len() > CONST_SUFFIX.len() && key.ends_with(CONST_SUFFIX) => {
                    let direction = &key[..key.len() - CONST_SUFFIX.len()];
                    rule.constants.insert(direction.to_string(), field.clone());
                }
                _ if key.starts_with(CONVERTER_PREFIX) && field.is_string() => {
                    let direction = &key[CONVERTER_PREFIX.len()..];
                    let name = field.as_str().unwrap_or_default();
                    rule.converters.insert(direction.to_string(), registry.resolve(name)?);
                }
                _ if field.is_array() => {
                    rule.paths.insert(key.clone(), parse_path(field, key, index)?);
                }
                _ => {
                    return Err(Error::invalid_rule(
                        format!("unrecognised field '{}'", key),
                        Some(index),
                    ))
                }
            }
        }

        Ok(rule)
    }

    /// Document form of this rule; converters are written by name
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(id) = &self.id {
            map.insert(ID_KEY.to_string(), Value::String(id.clone()));
        }
        for (direction, path) in &self.paths {
            map.insert(direction.clone(), path.to_value());
        }
        for (direction, constant) in &self.constants {
            map.insert(format!("{}{}", direction, CONST_SUFFIX), constant.clone());
        }
        for (direction, converter) in &self.converters {
            map.insert(
                format!("{}{}", CONVERTER_PREFIX, direction),
                Value::String(converter.name().to_string()),
            );
        }
        if let Some(calculate) = &self.calculate {
            map.insert(CALCULATE_KEY.to_string(), calculate.to_value());
        }
        if self.required {
            map.insert(REQUIRED_KEY.to_string(), Value::Bool(true));
        }
        if let Some(nested) = &self.nested {
            map.insert(
                NESTED_KEY.to_string(),
                Value::Array(nested.iter().map(MappingRule::to_value).collect()),
            );
        }
        Value::Object(map)
    }
}

fn parse_path(field: &Value, key: &str, index: usize) -> Result<Path> {
    Path::from_value(field).map_err(|e| {
        Error::invalid_rule(format!("bad path for '{}': {}", key, e), Some(index))
    })
}

fn parse_rule_list(value: &Value, registry: &ConverterRegistry) -> Result<Vec<MappingRule>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::invalid_rule("rules must be a sequence", None))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| MappingRule::from_value(item, registry, index))
        .collect()
}

/// An ordered list of mapping rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<MappingRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<MappingRule>) -> Self {
        Self { rules }
    }

    /// Parse a rule list from its document form
    pub fn from_value(value: &Value, registry: &ConverterRegistry) -> Result<Self> {
        parse_rule_list(value, registry).map(Self::new)
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.rules.iter().map(MappingRule::to_value).collect())
    }

    /// Append a rule
    pub fn push(&mut self, rule: MappingRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every direction name with a path in some rule, nested rules included
    pub fn directions(&self) -> BTreeSet<String> {
        fn collect(rules: &[MappingRule], names: &mut BTreeSet<String>) {
            for rule in rules {
                names.extend(rule.paths.keys().cloned());
                if let Some(nested) = &rule.nested {
                    collect(nested, names);
                }
            }
        }

        let mut names = BTreeSet::new();
        collect(&self.rules, &mut names);
        names
    }
}

impl From<Vec<MappingRule>> for RuleSet {
    fn from(rules: Vec<MappingRule>) -> Self {
        Self::new(rules)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a MappingRule;
    type IntoIter = std::slice::Iter<'a, MappingRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ConverterRegistry {
        ConverterRegistry::with_builtins()
    }

    #[test]
    fn test_parse_full_rule() {
        let raw = json!({
            "id": "pcp",
            "fhir": ["role", 0],
            "form": ["pcp"],
            "to_form": "always_true",
            "fhir_const": {"text": "PCP"},
            "calculate": ["role", 0, "text"],
            "required": true
        });
        let rule = MappingRule::from_value(&raw, &registry(), 0).unwrap();

        assert_eq!(rule.id.as_deref(), Some("pcp"));
        assert_eq!(rule.path("fhir").unwrap().to_value(), json!(["role", 0]));
        assert_eq!(rule.path("form").unwrap().to_value(), json!(["pcp"]));
        assert_eq!(rule.converter("form").unwrap().name(), "always_true");
        assert_eq!(rule.constant("fhir"), Some(&json!({"text": "PCP"})));
        assert!(rule.calculate.is_some());
        assert!(rule.required);
        assert_eq!(rule.to_value(), raw);
    }

    #[test]
    fn test_parse_nested_rules() {
        let raw = json!({
            "$mapping": [{"fhir": ["value"], "form": ["number"]}],
            "fhir": ["telecom", {"$collection": true, "$filter": {"system": "phone"}}],
            "form": ["phones", {"$collection": true}]
        });
        let rule = MappingRule::from_value(&raw, &registry(), 0).unwrap();
        let nested = rule.nested.as_ref().unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].path("form").unwrap().to_value(), json!(["number"]));
    }

    #[test]
    fn test_unknown_converter() {
        let raw = json!({"form": ["a"], "to_form": "nope"});
        let err = MappingRule::from_value(&raw, &registry(), 0).unwrap_err();
        assert!(matches!(err, Error::UnknownConverter { ref name } if name == "nope"));
    }

    #[test]
    fn test_invalid_fields() {
        let err = MappingRule::from_value(&json!({"form": "a"}), &registry(), 2).unwrap_err();
        assert!(matches!(err, Error::InvalidRule { rule_index: Some(2), .. }));

        let err = MappingRule::from_value(&json!({"required": "yes"}), &registry(), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidRule { .. }));

        let err = MappingRule::from_value(&json!({"form": ["a", true]}), &registry(), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidRule { .. }));

        let err = MappingRule::from_value(&json!(["form"]), &registry(), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidRule { .. }));
    }

    #[test]
    fn test_rule_set_directions() {
        let raw = json!([
            {"fhir": ["member", "resourceType"], "fhir_const": "Practitioner"},
            {"fhir": ["telecom", {"$collection": true}], "form": ["phones", {"$collection": true}],
             "$mapping": [{"fhir": ["value"], "legacy": ["number"]}]}
        ]);
        let rules = RuleSet::from_value(&raw, &registry()).unwrap();
        assert_eq!(rules.len(), 2);
        let directions: Vec<_> = rules.directions().into_iter().collect();
        assert_eq!(directions, vec!["fhir", "form", "legacy"]);
    }

    #[test]
    fn test_direction_reversed() {
        let direction = Direction::new("form", "fhir");
        assert_eq!(direction.reversed(), Direction::from(("fhir", "form")));
        assert_eq!(direction.to_string(), "form -> fhir");
    }

    #[test]
    fn test_label() {
        let rule = MappingRule::from_value(&json!({"form": ["a"]}), &registry(), 0).unwrap();
        assert_eq!(rule.label(), "form=[\"a\"]");
    }
}
