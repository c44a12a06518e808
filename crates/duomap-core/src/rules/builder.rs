//! Builder for creating mapping rules in code
//!
//! Paths are accepted in their JSON array form and parsed when the rule is
//! built, so the first malformed path surfaces from [`MappingRuleBuilder::build`].
//!
//! Copyright (c) 2025 Duomap Team
//! Licensed under the Apache-2.0 license

use super::converter::Converter;
use super::types::MappingRule;
use crate::error::{Error, Result};
use crate::path::Path;
use serde_json::Value;

/// Builder for creating mapping rules
#[derive(Debug, Default)]
pub struct MappingRuleBuilder {
    id: Option<String>,
    paths: Vec<(String, Value)>,
    rule: MappingRule,
    calculate: Option<Value>,
}

impl MappingRuleBuilder {
    /// Create a new rule builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diagnostic label
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the path for a direction
    pub fn path(mut self, direction: impl Into<String>, path: Value) -> Self {
        self.paths.push((direction.into(), path));
        self
    }

    /// Set the constant injected into a direction when its source is missing
    pub fn constant(mut self, direction: impl Into<String>, value: Value) -> Self {
        self.rule.constants.insert(direction.into(), value);
        self
    }

    /// Attach a converter applied before injecting into a direction
    pub fn converter(mut self, direction: impl Into<String>, converter: Converter) -> Self {
        self.rule.converters.insert(direction.into(), converter);
        self
    }

    /// Attach an infallible closure as the converter for a direction
    pub fn convert_with<F>(self, direction: impl Into<String>, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.converter(direction, Converter::infallible(name, func))
    }

    /// Set the path read from the output built so far
    pub fn calculate(mut self, path: Value) -> Self {
        self.calculate = Some(path);
        self
    }

    /// Mark the rule as required
    pub fn required(mut self) -> Self {
        self.rule.required = true;
        self
    }

    /// Set the rules applied to each item of a collection value
    pub fn nested(mut self, rules: Vec<MappingRule>) -> Self {
        self.rule.nested = Some(rules);
        self
    }

    /// Build the mapping rule
    pub fn build(self) -> Result<MappingRule> {
        let mut rule = self.rule;
        rule.id = self.id;

        for (direction, raw) in self.paths {
            let path = Path::from_value(&raw).map_err(|e| Error::InvalidRule {
                message: format!("bad path for '{}': {}", direction, e),
                rule_index: None,
            })?;
            rule.paths.insert(direction, path);
        }

        if let Some(raw) = self.calculate {
            let path = Path::from_value(&raw).map_err(|e| Error::InvalidRule {
                message: format!("bad calculate path: {}", e),
                rule_index: None,
            })?;
            rule.calculate = Some(path);
        }

        Ok(rule)
    }
}
