//! Mapping rules and their supporting types
//!
//! - [`types`] - rules, rule sets and direction pairs
//! - [`converter`] - named conversion functions and their registry
//! - [`built_in`] - converters available in every default registry
//! - [`builder`] - fluent construction of rules in code
//! - [`document`] - rule sets loaded from JSON or YAML documents
//!
//! Copyright (c) 2025 Duomap Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod built_in;
pub mod converter;
pub mod document;
pub mod types;

pub use builder::MappingRuleBuilder;
pub use converter::{Converter, ConverterFn, ConverterRegistry};
pub use document::MappingDocument;
pub use types::{Direction, MappingRule, RuleSet};
