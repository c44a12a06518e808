//! Diff engine for comparing transform output against snapshots

use crate::{GoldenError, Result};
use colored::*;
use duomap_core::Path as MappingPath;
use regex::Regex;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeSet;

const MASK: &str = "<volatile>";

/// Options for diff comparison
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Whether to use colored output
    pub colored: bool,

    /// Unchanged lines shown around each change when `full_diff` is off
    pub context_lines: usize,

    /// Whether to normalize JSON before comparison
    pub normalize: bool,

    /// Tolerance for floating point comparison
    pub float_tolerance: f64,

    /// Whether to show every line or only changes with context
    pub full_diff: bool,

    /// Maximum diff lines to show (0 = unlimited)
    pub max_diff_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            colored: true,
            context_lines: 3,
            normalize: true,
            float_tolerance: 1e-6,
            full_diff: false,
            max_diff_lines: 100,
        }
    }
}

/// Result of a diff operation
#[derive(Debug)]
pub struct DiffResult {
    /// Whether the values match
    pub matches: bool,

    /// Human-readable diff output
    pub diff_output: String,

    /// Summary of changes
    pub summary: DiffSummary,
}

/// Summary of diff changes
#[derive(Debug, Default)]
pub struct DiffSummary {
    /// Number of added lines
    pub added: usize,

    /// Number of removed lines
    pub removed: usize,

    /// Number of differing paths
    pub changed: usize,

    /// Mapping paths that differ, with a note on how
    pub differing_paths: Vec<String>,
}

/// Engine for comparing JSON values
pub struct DiffEngine {
    options: DiffOptions,
    volatile_patterns: Vec<(MappingPath, Regex)>,
}

impl DiffEngine {
    /// Create a new diff engine
    pub fn new(options: DiffOptions) -> Self {
        Self {
            options,
            volatile_patterns: Vec::new(),
        }
    }

    /// Mask string values at `path` that match `pattern` before comparing
    pub fn add_volatile_pattern(&mut self, path: MappingPath, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern)
            .map_err(|e| GoldenError::CorpusError(format!("Invalid regex pattern: {}", e)))?;

        self.volatile_patterns.push((path, regex));
        Ok(())
    }

    /// Compare two JSON values
    pub fn compare(&self, expected: &Value, actual: &Value) -> DiffResult {
        let (expected, actual) = if self.options.normalize {
            (
                crate::snapshot::normalize_json(expected),
                crate::snapshot::normalize_json(actual),
            )
        } else {
            (expected.clone(), actual.clone())
        };

        let expected = self.mask_volatile_fields(&expected);
        let actual = self.mask_volatile_fields(&actual);

        if self.values_match(&expected, &actual) {
            return DiffResult {
                matches: true,
                diff_output: String::new(),
                summary: DiffSummary::default(),
            };
        }

        DiffResult {
            matches: false,
            diff_output: self.generate_diff_output(&expected, &actual),
            summary: self.collect_diff_summary(&expected, &actual),
        }
    }

    /// Exact structural equality, with tolerance for floats
    fn values_match(&self, expected: &Value, actual: &Value) -> bool {
        match (expected, actual) {
            (Value::Object(exp), Value::Object(act)) => {
                exp.len() == act.len()
                    && exp
                        .iter()
                        .all(|(key, e)| act.get(key).is_some_and(|a| self.values_match(e, a)))
            }
            (Value::Array(exp), Value::Array(act)) => {
                exp.len() == act.len()
                    && exp.iter().zip(act).all(|(e, a)| self.values_match(e, a))
            }
            (Value::Number(exp), Value::Number(act)) if exp.is_f64() || act.is_f64() => {
                match (exp.as_f64(), act.as_f64()) {
                    (Some(e), Some(a)) => (e - a).abs() <= self.options.float_tolerance,
                    _ => false,
                }
            }
            (exp, act) => exp == act,
        }
    }

    /// Generate human-readable diff output
    fn generate_diff_output(&self, expected: &Value, actual: &Value) -> String {
        let expected_str = serde_json::to_string_pretty(expected).unwrap_or_default();
        let actual_str = serde_json::to_string_pretty(actual).unwrap_or_default();

        let text_diff = TextDiff::from_lines(&expected_str, &actual_str);
        let mut output = String::new();

        let header = "=== Diff (snapshot vs actual) ===\n";
        if self.options.colored {
            output.push_str(&header.bold().to_string());
        } else {
            output.push_str(header);
        }

        if self.options.full_diff {
            for change in text_diff.iter_all_changes() {
                if !self.push_change(&mut output, change.tag(), &change.to_string()) {
                    break;
                }
            }
            return output;
        }

        'groups: for group in text_diff.grouped_ops(self.options.context_lines) {
            output.push_str("@@\n");
            for op in group {
                for change in text_diff.iter_changes(&op) {
                    if !self.push_change(&mut output, change.tag(), &change.to_string()) {
                        break 'groups;
                    }
                }
            }
        }

        output
    }

    /// Append one diff line; returns `false` once the line budget is spent
    fn push_change(&self, output: &mut String, tag: ChangeTag, line: &str) -> bool {
        let max = self.options.max_diff_lines;
        if max > 0 && output.lines().count() > max {
            output.push_str("... (diff truncated) ...\n");
            return false;
        }

        let (sign, line) = match tag {
            ChangeTag::Delete => ("-", line),
            ChangeTag::Insert => ("+", line),
            ChangeTag::Equal => (" ", line),
        };

        let rendered = match (self.options.colored, tag) {
            (true, ChangeTag::Delete) => format!("{}", format!("{}{}", sign, line).red()),
            (true, ChangeTag::Insert) => format!("{}", format!("{}{}", sign, line).green()),
            _ => format!("{}{}", sign, line),
        };
        output.push_str(&rendered);
        true
    }

    /// Collect summary of differences
    fn collect_diff_summary(&self, expected: &Value, actual: &Value) -> DiffSummary {
        let mut summary = DiffSummary::default();

        self.collect_diff_paths(expected, actual, MappingPath::new(), &mut summary.differing_paths);

        let expected_str = serde_json::to_string_pretty(expected).unwrap_or_default();
        let actual_str = serde_json::to_string_pretty(actual).unwrap_or_default();
        for change in TextDiff::from_lines(&expected_str, &actual_str).iter_all_changes() {
            match change.tag() {
                ChangeTag::Delete => summary.removed += 1,
                ChangeTag::Insert => summary.added += 1,
                ChangeTag::Equal => {}
            }
        }

        summary.changed = summary.differing_paths.len();
        summary
    }

    /// Recursively collect mapping paths that differ
    fn collect_diff_paths(&self, expected: &Value, actual: &Value, path: MappingPath, paths: &mut Vec<String>) {
        match (expected, actual) {
            (Value::Object(exp), Value::Object(act)) => {
                let keys: BTreeSet<_> = exp.keys().chain(act.keys()).collect();
                for key in keys {
                    let child = path.clone().key(key.clone());
                    match (exp.get(key), act.get(key)) {
                        (Some(e), Some(a)) if !self.values_match(e, a) => {
                            self.collect_diff_paths(e, a, child, paths)
                        }
                        (Some(_), None) => paths.push(format!("{} (missing in actual)", child)),
                        (None, Some(_)) => paths.push(format!("{} (extra in actual)", child)),
                        _ => {}
                    }
                }
            }
            (Value::Array(exp), Value::Array(act)) => {
                for (i, (e, a)) in exp.iter().zip(act).enumerate() {
                    if !self.values_match(e, a) {
                        self.collect_diff_paths(e, a, path.clone().index(i), paths);
                    }
                }
                if exp.len() != act.len() {
                    paths.push(format!(
                        "{} (sequence length {} vs {})",
                        path,
                        exp.len(),
                        act.len()
                    ));
                }
            }
            _ => {
                if !self.values_match(expected, actual) {
                    paths.push(path.to_string());
                }
            }
        }
    }

    /// Replace volatile string values with a fixed marker
    fn mask_volatile_fields(&self, value: &Value) -> Value {
        let mut masked = value.clone();

        for (path, pattern) in &self.volatile_patterns {
            crate::select::for_each_mut(&mut masked, path, &mut |field| {
                if field.as_str().is_some_and(|s| pattern.is_match(s)) {
                    *field = Value::String(MASK.to_string());
                }
            });
        }

        masked
    }
}
