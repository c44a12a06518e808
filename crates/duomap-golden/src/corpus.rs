//! Test corpus management for golden tests
//!
//! A corpus case lives in its own directory as `test.json`. The source record
//! and the rules can be written inline or point at sibling files; a rules
//! file is a full mapping document in JSON or YAML and supplies the default
//! direction.

use crate::{GoldenError, Result};
use duomap_core::{MappingDocument, Path as MappingPath};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A test case in the corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Name of the test case
    pub name: String,

    /// Category/group of the test
    pub category: String,

    /// Input data
    pub input: TestInput,

    /// `[from, to]` override; defaults to the mapping document's directions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directions: Option<(String, String)>,

    /// Expected behavior configuration
    pub expectations: TestExpectations,

    /// Test metadata
    pub metadata: TestMetadata,
}

/// Input for a test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestInput {
    /// Record to transform, or the name of a `.json` file holding it
    pub source: Value,

    /// Inline rule list, or the name of a mapping document file
    pub rules: Value,

    /// Mapping document loaded from `rules` when it names a file
    #[serde(skip)]
    pub document: Option<MappingDocument>,
}

/// Expected behavior for a test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExpectations {
    /// Whether the transform should succeed
    pub should_succeed: bool,

    /// Regex the error message must match if should_succeed is false
    pub error_pattern: Option<String>,

    /// Whether the reverse transform must reproduce the source
    #[serde(default)]
    pub round_trip: bool,

    /// Paths removed from both sides before comparison
    #[serde(default)]
    pub ignore_fields: Vec<MappingPath>,

    /// Volatile fields that may change
    #[serde(default)]
    pub volatile_fields: Vec<VolatileFieldSpec>,
}

/// A field whose value is masked before comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatileFieldSpec {
    pub path: MappingPath,
    pub pattern: String,
}

/// Metadata about a test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMetadata {
    /// Description of what this tests
    pub description: String,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether this test is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Priority level (lower = higher priority)
    #[serde(default = "default_priority")]
    pub priority: u32,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    100
}

/// Manages the test corpus
pub struct CorpusManager {
    corpus_dir: PathBuf,
}

impl CorpusManager {
    /// Create a new corpus manager
    pub fn new(corpus_dir: impl AsRef<Path>) -> Self {
        Self {
            corpus_dir: corpus_dir.as_ref().to_path_buf(),
        }
    }

    /// Discover all test cases in the corpus
    pub fn discover_tests(&self) -> Result<Vec<TestCase>> {
        let mut tests = Vec::new();

        if !self.corpus_dir.exists() {
            return Ok(tests);
        }

        for entry in WalkDir::new(&self.corpus_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.is_file() && path.file_name() == Some(std::ffi::OsStr::new("test.json")) {
                match self.load_test_case(path) {
                    Ok(test_case) => tests.push(test_case),
                    Err(e) => {
                        eprintln!("Warning: Failed to load test case {:?}: {}", path, e);
                    }
                }
            }
        }

        tests.sort_by(|a, b| {
            (a.metadata.priority, &a.category, &a.name).cmp(&(b.metadata.priority, &b.category, &b.name))
        });

        Ok(tests)
    }

    /// Load a specific test case, resolving file references next to it
    pub fn load_test_case(&self, path: &Path) -> Result<TestCase> {
        let content = fs::read_to_string(path)?;
        let mut test_case: TestCase = serde_json::from_str(&content)?;

        let test_dir = path
            .parent()
            .ok_or_else(|| GoldenError::CorpusError(format!("{:?} has no parent directory", path)))?;

        if let Value::String(ref filename) = test_case.input.source {
            if filename.ends_with(".json") {
                let source_content = fs::read_to_string(test_dir.join(filename))?;
                test_case.input.source = serde_json::from_str(&source_content)?;
            }
        }

        if let Value::String(ref filename) = test_case.input.rules {
            test_case.input.document = Some(load_document(&test_dir.join(filename))?);
        }

        Ok(test_case)
    }

    /// Filter tests by category
    pub fn filter_by_category(&self, tests: Vec<TestCase>, category: &str) -> Vec<TestCase> {
        tests
            .into_iter()
            .filter(|t| t.category == category || category == "*")
            .collect()
    }

    /// Filter tests by tags
    pub fn filter_by_tags(&self, tests: Vec<TestCase>, tags: &[String]) -> Vec<TestCase> {
        if tags.is_empty() {
            return tests;
        }

        tests
            .into_iter()
            .filter(|t| tags.iter().any(|tag| t.metadata.tags.contains(tag)))
            .collect()
    }

    /// Get enabled tests only
    pub fn filter_enabled(&self, tests: Vec<TestCase>) -> Vec<TestCase> {
        tests.into_iter().filter(|t| t.metadata.enabled).collect()
    }

    /// Create the corpus directory structure
    pub fn init_corpus(&self) -> Result<()> {
        let dirs = ["basic", "collections", "edge-cases", "errors", "mappings", "regression"];

        for dir in &dirs {
            fs::create_dir_all(self.corpus_dir.join(dir))?;
        }

        self.create_sample_test()
    }

    /// Create a sample test case
    fn create_sample_test(&self) -> Result<()> {
        let test_dir = self.corpus_dir.join("basic/constant-envelope");
        fs::create_dir_all(&test_dir)?;

        let test_case = TestCase {
            name: "constant-envelope".to_string(),
            category: "basic".to_string(),
            input: TestInput {
                source: serde_json::json!({"lastName": "Last"}),
                rules: serde_json::json!([
                    {"fhir": ["resourceType"], "fhir_const": "Practitioner"},
                    {"fhir": ["name", 0, "family", 0], "form": ["lastName"]}
                ]),
                document: None,
            },
            directions: Some(("form".to_string(), "fhir".to_string())),
            expectations: TestExpectations {
                should_succeed: true,
                error_pattern: None,
                round_trip: true,
                ignore_fields: vec![],
                volatile_fields: vec![],
            },
            metadata: TestMetadata {
                description: "Constant envelope plus one indexed field".to_string(),
                tags: vec!["basic".to_string(), "smoke".to_string()],
                enabled: true,
                priority: 1,
            },
        };

        let content = serde_json::to_string_pretty(&test_case)?;
        fs::write(test_dir.join("test.json"), content)?;

        Ok(())
    }

    /// List all test categories
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let mut categories: Vec<String> = self
            .discover_tests()?
            .into_iter()
            .map(|t| t.category)
            .collect();

        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// Get statistics about the corpus
    pub fn get_statistics(&self) -> Result<CorpusStatistics> {
        let tests = self.discover_tests()?;

        let mut stats = CorpusStatistics {
            total_tests: tests.len(),
            ..Default::default()
        };

        for test in tests {
            if test.metadata.enabled {
                stats.enabled_tests += 1;
            } else {
                stats.disabled_tests += 1;
            }
            if test.expectations.round_trip {
                stats.round_trip_tests += 1;
            }

            *stats.tests_by_category.entry(test.category).or_insert(0) += 1;

            for tag in test.metadata.tags {
                *stats.tests_by_tag.entry(tag).or_insert(0) += 1;
            }
        }

        Ok(stats)
    }
}

/// Load a mapping document, choosing the format by file extension
fn load_document(path: &Path) -> Result<MappingDocument> {
    let text = fs::read_to_string(path)?;
    let document = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => MappingDocument::from_yaml_str(&text)?,
        Some("json") => MappingDocument::from_json_str(&text)?,
        _ => {
            return Err(GoldenError::CorpusError(format!(
                "Unrecognised mapping document {:?}; expected .json, .yaml or .yml",
                path
            )))
        }
    };
    Ok(document)
}

/// Statistics about the test corpus
#[derive(Debug, Default)]
pub struct CorpusStatistics {
    pub total_tests: usize,
    pub enabled_tests: usize,
    pub disabled_tests: usize,
    pub round_trip_tests: usize,
    pub tests_by_category: std::collections::BTreeMap<String, usize>,
    pub tests_by_tag: std::collections::BTreeMap<String, usize>,
}

impl CorpusStatistics {
    /// Print statistics to stdout
    pub fn print(&self) {
        println!("=== Corpus Statistics ===");
        println!("Total tests: {}", self.total_tests);
        println!("Enabled: {}", self.enabled_tests);
        println!("Disabled: {}", self.disabled_tests);
        println!("Round trip: {}", self.round_trip_tests);

        if !self.tests_by_category.is_empty() {
            println!("\nTests by category:");
            for (category, count) in &self.tests_by_category {
                println!("  {}: {}", category, count);
            }
        }

        if !self.tests_by_tag.is_empty() {
            println!("\nTests by tag:");
            for (tag, count) in &self.tests_by_tag {
                println!("  {}: {}", tag, count);
            }
        }
    }
}
