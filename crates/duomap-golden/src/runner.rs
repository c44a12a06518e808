//! Golden test runner for executing snapshot tests

use crate::{
    corpus::{CorpusManager, TestCase},
    diff::DiffEngine,
    snapshot::{apply_ignores, SnapshotManager},
    GoldenConfig, GoldenError, Result,
};
use colored::*;
use duomap_core::{ConverterRegistry, Direction, Mapper, RuleSet};
use regex::Regex;
use serde_json::Value;
use std::time::Instant;

/// Result of running a golden test
#[derive(Debug)]
pub struct TestResult {
    /// Name of the test
    pub name: String,

    /// Whether the test passed
    pub passed: bool,

    /// Error message if failed
    pub error: Option<String>,

    /// Diff output if comparison failed
    pub diff: Option<String>,

    /// Execution time in milliseconds
    pub duration_ms: u64,

    /// Whether snapshot was updated
    pub updated: bool,
}

impl TestResult {
    /// Print the test result
    pub fn print(&self, verbose: bool) {
        let status = if self.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("{} {} ({}ms)", status, self.name, self.duration_ms);

        if let Some(ref error) = self.error {
            println!("  {}: {}", "Error".red(), error);
        }

        if verbose || !self.passed {
            if let Some(ref diff) = self.diff {
                println!("{}", diff);
            }
        }

        if self.updated {
            println!("  {}", "Snapshot updated".yellow());
        }
    }
}

/// Outcome of executing one case: passed, diff, snapshot updated
type Execution = (bool, Option<String>, bool);

/// Runner for golden tests
pub struct GoldenTestRunner {
    config: GoldenConfig,
    corpus_manager: CorpusManager,
    snapshot_manager: SnapshotManager,
    registry: ConverterRegistry,
}

impl GoldenTestRunner {
    /// Create a new test runner using the built-in converters
    pub fn new(config: GoldenConfig) -> Self {
        let corpus_manager = CorpusManager::new(&config.corpus_dir);
        let snapshot_manager = SnapshotManager::new(&config.snapshot_dir);

        Self {
            config,
            corpus_manager,
            snapshot_manager,
            registry: ConverterRegistry::with_builtins(),
        }
    }

    /// Resolve converter names against `registry` instead of the built-ins
    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Run a single test by `category/name`
    pub fn run_test(&self, test_name: &str) -> Result<TestResult> {
        let start = Instant::now();

        let test_path = self.config.corpus_dir.join(test_name).join("test.json");
        let result = self
            .corpus_manager
            .load_test_case(&test_path)
            .and_then(|test_case| self.execute_test(&test_case));

        let duration_ms = start.elapsed().as_millis() as u64;

        let test_result = match result {
            Ok((passed, diff, updated)) => TestResult {
                name: test_name.to_string(),
                passed,
                error: if passed { None } else { Some("Output mismatch".to_string()) },
                diff,
                duration_ms,
                updated,
            },
            Err(e) => TestResult {
                name: test_name.to_string(),
                passed: false,
                error: Some(e.to_string()),
                diff: None,
                duration_ms,
                updated: false,
            },
        };

        if self.config.verbose {
            test_result.print(true);
        }

        if test_result.passed {
            Ok(test_result)
        } else {
            Err(GoldenError::TestFailed(format!(
                "Test '{}' failed: {}{}",
                test_name,
                test_result.error.as_deref().unwrap_or("Unknown error"),
                test_result.diff.as_deref().map(|d| format!("\n{}", d)).unwrap_or_default()
            )))
        }
    }

    /// Run a batch of tests whose name or category contains `pattern`
    pub fn run_batch(&self, pattern: &str) -> Result<Vec<TestResult>> {
        let mut results = Vec::new();

        let tests = self.corpus_manager.discover_tests()?;

        let filtered_tests: Vec<_> = if pattern == "*" {
            tests
        } else {
            tests
                .into_iter()
                .filter(|t| t.name.contains(pattern) || t.category.contains(pattern))
                .collect()
        };

        if filtered_tests.is_empty() {
            return Err(GoldenError::CorpusError(format!(
                "No tests found matching pattern '{}'",
                pattern
            )));
        }

        let matched = filtered_tests.len();
        let filtered_tests = self.corpus_manager.filter_enabled(filtered_tests);
        let disabled = matched - filtered_tests.len();

        if disabled > 0 {
            println!("Running {} tests ({} disabled)...\n", filtered_tests.len(), disabled);
        } else {
            println!("Running {} tests...\n", filtered_tests.len());
        }

        let mut passed = 0;
        let mut failed = 0;

        for test_case in filtered_tests {
            let test_name = format!("{}/{}", test_case.category, test_case.name);
            let result = self.run_test(&test_name).unwrap_or_else(|e| TestResult {
                name: test_name.clone(),
                passed: false,
                error: Some(e.to_string()),
                diff: None,
                duration_ms: 0,
                updated: false,
            });

            if result.passed {
                passed += 1;
            } else {
                failed += 1;
            }

            result.print(self.config.verbose);
            results.push(result);
        }

        println!("\n{}", "=== Test Summary ===".bold());
        println!(
            "{}: {} passed, {} failed",
            "Results".bold(),
            passed.to_string().green(),
            failed.to_string().red()
        );

        if failed > 0 {
            Err(GoldenError::TestFailed(format!("{} test(s) failed", failed)))
        } else {
            Ok(results)
        }
    }

    /// Execute a single test case
    fn execute_test(&self, test_case: &TestCase) -> Result<Execution> {
        if !test_case.metadata.enabled {
            return Ok((true, None, false));
        }

        let (mapper, direction) = self.build_mapper(test_case)?;
        let source = &test_case.input.source;

        let output = match (mapper.transform(source, &direction), test_case.expectations.should_succeed) {
            (Ok(output), true) => output,
            (Err(e), true) => {
                return Err(GoldenError::TestFailed(format!("Transform failed: {}", e)))
            }
            (Err(e), false) => return self.check_expected_error(test_case, &e),
            (Ok(output), false) => {
                return Err(GoldenError::TestFailed(format!(
                    "Transform succeeded but a failure was expected; output: {}",
                    output
                )))
            }
        };

        if test_case.expectations.round_trip {
            let back = mapper.transform(&output, &direction.reversed())?;
            let diff = DiffEngine::new(self.config.diff_options.clone()).compare(source, &back);
            if !diff.matches {
                return Ok((
                    false,
                    Some(format!("Round trip ({}) changed the source:\n{}", direction.reversed(), diff.diff_output)),
                    false,
                ));
            }
        }

        self.compare_snapshot(test_case, &direction, output)
    }

    /// Compare transform output against the stored snapshot
    fn compare_snapshot(&self, test_case: &TestCase, direction: &Direction, output: Value) -> Result<Execution> {
        let snapshot_name = format!("{}/{}", test_case.category, test_case.name);

        if !self.snapshot_manager.exists(&snapshot_name) {
            if self.config.create_missing || self.config.update_snapshots {
                self.snapshot_manager.create(
                    &snapshot_name,
                    output,
                    Some(test_case.metadata.description.clone()),
                    Some(direction.to_string()),
                )?;
                return Ok((true, None, true));
            }
            return Err(GoldenError::SnapshotMismatch(format!(
                "Snapshot '{}' does not exist. Run with UPDATE_GOLDEN=1 to create it.",
                snapshot_name
            )));
        }

        let snapshot = self.snapshot_manager.load(&snapshot_name)?;

        let mut diff_engine = DiffEngine::new(self.config.diff_options.clone());
        for volatile in &test_case.expectations.volatile_fields {
            diff_engine.add_volatile_pattern(volatile.path.clone(), &volatile.pattern)?;
        }

        let mut expected = snapshot.content;
        let mut actual = output.clone();
        apply_ignores(&mut expected, &test_case.expectations.ignore_fields);
        apply_ignores(&mut actual, &test_case.expectations.ignore_fields);

        let diff_result = diff_engine.compare(&expected, &actual);

        if diff_result.matches {
            Ok((true, None, false))
        } else if self.config.update_snapshots {
            self.snapshot_manager.backup(&snapshot_name)?;
            self.snapshot_manager.update(&snapshot_name, output)?;
            Ok((true, Some(diff_result.diff_output), true))
        } else {
            Ok((false, Some(diff_result.diff_output), false))
        }
    }

    /// Check a transform error against the case's expected error pattern
    fn check_expected_error(&self, test_case: &TestCase, error: &duomap_core::Error) -> Result<Execution> {
        let Some(pattern) = &test_case.expectations.error_pattern else {
            return Ok((true, None, false));
        };

        let regex = Regex::new(pattern)
            .map_err(|e| GoldenError::CorpusError(format!("Invalid error pattern: {}", e)))?;
        let message = error.to_string();

        if regex.is_match(&message) {
            Ok((true, None, false))
        } else {
            Err(GoldenError::TestFailed(format!(
                "Error '{}' does not match pattern '{}'",
                message, pattern
            )))
        }
    }

    /// Build the mapper and direction a case runs with
    fn build_mapper(&self, test_case: &TestCase) -> Result<(Mapper, Direction)> {
        let mapper = match &test_case.input.document {
            Some(document) => document.clone().into_mapper(&self.registry)?,
            None => {
                let (from, to) = test_case.directions.clone().ok_or_else(|| {
                    GoldenError::CorpusError(format!(
                        "Test '{}' has inline rules but no directions",
                        test_case.name
                    ))
                })?;
                let rules = RuleSet::from_value(&test_case.input.rules, &self.registry)?;
                Mapper::new(test_case.name.clone(), rules, Direction::new(from, to))
            }
        };

        let direction = match &test_case.directions {
            Some(directions) => Direction::from(directions.clone()),
            None => mapper.direction().clone(),
        };

        Ok((mapper, direction))
    }

    /// Initialize the corpus with sample tests
    pub fn init_corpus(&self) -> Result<()> {
        self.corpus_manager.init_corpus()
    }

    /// List all available tests
    pub fn list_tests(&self) -> Result<Vec<String>> {
        let tests = self.corpus_manager.discover_tests()?;
        Ok(tests
            .into_iter()
            .map(|t| format!("{}/{}", t.category, t.name))
            .collect())
    }

    /// Print corpus statistics
    pub fn get_statistics(&self) -> Result<()> {
        let stats = self.corpus_manager.get_statistics()?;
        stats.print();
        Ok(())
    }
}
