//! Duomap Core - declarative bidirectional mapping between JSON representations
//!
//! A mapping is a list of rules. Each rule names a path into every
//! representation it relates, and the same rule list drives the transform in
//! both directions.
//!
//! # Main Components
//!
//! - **Paths**: Key, index, filter and collection segments ([`Path`], [`Segment`])
//! - **Matcher**: Partial structural matching used by filter segments ([`matches`])
//! - **Extractor**: Read a value at a path, treating falsy values as absent ([`extract`])
//! - **Injector**: Write a value at a path, creating structure as needed ([`inject`])
//! - **Engine**: Rule-driven transforms and the [`Mapper`] facade ([`transform`])
//! - **Rules**: Rule types, converters and document loading ([`rules`])
//! - **Error Handling**: Error types using `thiserror` and `anyhow` ([`Error`])
//!
//! # Example
//!
//! ```
//! use duomap_core::{ConverterRegistry, Direction, RuleSet, transform};
//! use serde_json::json;
//!
//! fn example() -> duomap_core::Result<()> {
//!     let rules = RuleSet::from_value(
//!         &json!([
//!             {"fhir": ["resourceType"], "fhir_const": "Practitioner"},
//!             {"fhir": ["telecom", {"system": "phone"}, "value"], "form": ["phone"]}
//!         ]),
//!         &ConverterRegistry::with_builtins(),
//!     )?;
//!
//!     let fhir = transform(&json!({"phone": "555"}), rules.rules(), &Direction::new("form", "fhir"))?;
//!     assert_eq!(
//!         fhir,
//!         json!({"resourceType": "Practitioner", "telecom": [{"system": "phone", "value": "555"}]})
//!     );
//!
//!     let form = transform(&fhir, rules.rules(), &Direction::new("fhir", "form"))?;
//!     assert_eq!(form, json!({"phone": "555"}));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod engine;
pub mod error;
pub mod extractor;
pub mod injector;
pub mod matcher;
pub mod path;
pub mod rules;
pub mod value;

#[cfg(test)]
mod proptest_strategies;

// Re-export main types for convenience
pub use engine::{transform, Mapper};
pub use error::{Error, Result};
pub use extractor::{extract, extract_cow};
pub use injector::{inject, inject_in_place, InjectOutcome, MAX_INDEX_PADDING};
pub use matcher::{matches, matches_fields};
pub use path::{Path, Segment};
pub use rules::{
    Converter, ConverterRegistry, Direction, MappingDocument, MappingRule, MappingRuleBuilder,
    RuleSet,
};
pub use value::{is_present, is_truthy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
