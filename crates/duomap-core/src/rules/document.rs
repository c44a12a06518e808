//! Mapping documents: rule sets loaded from JSON or YAML text
//!
//! A document names the pair of representations it maps between and carries
//! the rule list in its document form:
//!
//! ```yaml
//! name: practitioner
//! directions: [form, fhir]
//! rules:
//!   - fhir: [member, resourceType]
//!     fhir_const: Practitioner
//!   - fhir: [member, telecom, {system: phone}, value]
//!     form: [phone]
//! ```
//!
//! Copyright (c) 2025 Duomap Team
//! Licensed under the Apache-2.0 license

use super::converter::ConverterRegistry;
use super::types::{Direction, RuleSet};
use crate::engine::Mapper;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A serialized rule set with its default direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDocument {
    /// Name of the mapping
    pub name: String,

    /// What the mapping is for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default `[from, to]` direction; `reverse` swaps it
    pub directions: (String, String),

    /// Rules in document form
    pub rules: Value,
}

impl MappingDocument {
    /// Parse a document from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a document from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Serialize the document as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn direction(&self) -> Direction {
        Direction::new(&self.directions.0, &self.directions.1)
    }

    /// Resolve the rules against `registry`
    pub fn rule_set(&self, registry: &ConverterRegistry) -> Result<RuleSet> {
        if self.directions.0 == self.directions.1 {
            return Err(Error::invalid_rule(
                format!("document '{}' maps '{}' onto itself", self.name, self.directions.0),
                None,
            ));
        }
        RuleSet::from_value(&self.rules, registry)
    }

    /// Build a [`Mapper`] for this document
    pub fn into_mapper(self, registry: &ConverterRegistry) -> Result<Mapper> {
        let rules = self.rule_set(registry)?;
        let direction = self.direction();
        log::debug!(
            "Loaded mapping '{}' with {} rules ({})",
            self.name,
            rules.len(),
            direction
        );
        Ok(Mapper::new(self.name, rules, direction))
    }
}
