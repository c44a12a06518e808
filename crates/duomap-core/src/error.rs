//! Error types for the Duomap core library
//!
//! This module defines the error handling system for Duomap, using thiserror
//! for the error definitions and anyhow for failures raised inside converters.
//!
//! Absence is never an error: a missing key, an unmatched filter or a `null`
//! in the middle of a path simply resolves to nothing. Errors are reserved for
//! paths that cannot be walked and for rule-authoring defects.

use serde_json::Value;
use thiserror::Error;

/// Main error type for Duomap operations
#[derive(Error, Debug)]
pub enum Error {
    /// A path segment cannot be applied to the value under the cursor
    #[error("Unsupported path: {message} (segment {segment} at position {position})")]
    UnsupportedPath {
        message: String,
        segment: String,
        position: usize,
    },

    /// A rule marked `required` resolved to an absent value
    #[error("Required field missing: rule {rule} with source {source_value}")]
    RequiredField { rule: Value, source_value: Value },

    /// A `$mapping` rule resolved to something other than a sequence
    #[error("Collection expected for nested mapping, found {found}")]
    CollectionExpected { found: String },

    /// A converter attached to a rule failed
    #[error("Conversion '{converter}' failed: {message}")]
    Conversion {
        converter: String,
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// A rule document entry could not be interpreted
    #[error("Invalid rule{}: {message}", .rule_index.map(|i| format!(" #{}", i)).unwrap_or_default())]
    InvalidRule {
        message: String,
        rule_index: Option<usize>,
    },

    /// A rule references a converter that is not registered
    #[error("Unknown converter: {name}")]
    UnknownConverter { name: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an unsupported path error for the segment at `position`
    pub fn unsupported_path(
        message: impl Into<String>,
        segment: impl Into<String>,
        position: usize,
    ) -> Self {
        Self::UnsupportedPath {
            message: message.into(),
            segment: segment.into(),
            position,
        }
    }

    /// Create an invalid rule error
    pub fn invalid_rule(message: impl Into<String>, rule_index: Option<usize>) -> Self {
        Self::InvalidRule {
            message: message.into(),
            rule_index,
        }
    }

    /// Whether this error is a path/shape incompatibility
    pub fn is_unsupported_path(&self) -> bool {
        matches!(self, Self::UnsupportedPath { .. })
    }

    /// Whether this error is a required-field failure
    pub fn is_required_field(&self) -> bool {
        matches!(self, Self::RequiredField { .. })
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}
