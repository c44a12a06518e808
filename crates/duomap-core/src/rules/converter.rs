//! Named conversion functions attached to mapping rules
//!
//! A rule's `to_<direction>` entry names a [`Converter`] that is applied to the
//! resolved value before it is injected into that direction. Converters are
//! held behind an `Arc` so rule sets stay cheap to clone and can be shared
//! across threads.
//!
//! Copyright (c) 2025 Duomap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Signature of a conversion function
pub type ConverterFn = dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync;

/// A named conversion function
#[derive(Clone)]
pub struct Converter {
    name: String,
    func: Arc<ConverterFn>,
}

impl Converter {
    /// Wrap a fallible conversion function
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Wrap an infallible conversion function
    pub fn infallible<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::new(name, move |value| Ok(func(value)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the conversion, wrapping failures with the converter name
    pub fn apply(&self, value: &Value) -> Result<Value> {
        (self.func)(value).map_err(|source| Error::Conversion {
            converter: self.name.clone(),
            message: source.to_string(),
            source,
        })
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter").field("name", &self.name).finish()
    }
}

impl PartialEq for Converter {
    fn eq(&self, other: &Self) -> bool {
        // Function pointers are not comparable; the name identifies the converter
        self.name == other.name
    }
}

/// Lookup table resolving converter names used in rule documents
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Converter>,
}

impl ConverterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the built-in converters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for converter in super::built_in::all() {
            registry.insert(converter);
        }
        registry
    }

    /// Register a converter under its own name, replacing any previous one
    pub fn insert(&mut self, converter: Converter) -> &mut Self {
        if self.converters.contains_key(converter.name()) {
            log::warn!("Replacing registered converter '{}'", converter.name());
        }
        self.converters.insert(converter.name().to_string(), converter);
        self
    }

    /// Register a fallible function under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.insert(Converter::new(name, func))
    }

    pub fn get(&self, name: &str) -> Option<&Converter> {
        self.converters.get(name)
    }

    /// Look up a converter, failing when the name is not registered
    pub fn resolve(&self, name: &str) -> Result<Converter> {
        self.get(name).cloned().ok_or_else(|| Error::UnknownConverter {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.converters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
