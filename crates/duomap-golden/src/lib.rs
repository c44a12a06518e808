//! Golden test infrastructure for the Duomap mapping engine
//!
//! This crate provides snapshot testing for mapping documents: each corpus
//! case names a rule set, a direction and a source record, and the transform
//! output is compared against a stored snapshot. Cases can also require that
//! the reverse transform reproduces the source.

pub mod corpus;
pub mod diff;
pub mod runner;
pub mod select;
pub mod snapshot;

use std::path::PathBuf;
use thiserror::Error;

pub use corpus::CorpusManager;
pub use diff::{DiffEngine, DiffOptions};
pub use runner::{GoldenTestRunner, TestResult};
pub use snapshot::{Snapshot, SnapshotManager};

/// Golden test error types
#[derive(Debug, Error)]
pub enum GoldenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mapping error: {0}")]
    Mapping(#[from] duomap_core::Error),

    #[error("Snapshot mismatch: {0}")]
    SnapshotMismatch(String),

    #[error("Corpus error: {0}")]
    CorpusError(String),

    #[error("Test failed: {0}")]
    TestFailed(String),
}

pub type Result<T> = std::result::Result<T, GoldenError>;

/// Configuration for golden tests
#[derive(Debug, Clone)]
pub struct GoldenConfig {
    /// Root directory for test corpus
    pub corpus_dir: PathBuf,

    /// Directory for snapshots
    pub snapshot_dir: PathBuf,

    /// Whether to update snapshots
    pub update_snapshots: bool,

    /// Whether to create missing snapshots
    pub create_missing: bool,

    /// Diff options
    pub diff_options: DiffOptions,

    /// Verbose output
    pub verbose: bool,
}

impl Default for GoldenConfig {
    fn default() -> Self {
        let update_snapshots = env_flag("UPDATE_GOLDEN");

        Self {
            corpus_dir: PathBuf::from("../../golden-corpus"),
            snapshot_dir: PathBuf::from("../../golden-corpus/snapshots"),
            update_snapshots,
            create_missing: update_snapshots,
            diff_options: DiffOptions::default(),
            verbose: false,
        }
    }
}

impl GoldenConfig {
    /// Create config from environment and defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(corpus_dir) = std::env::var("GOLDEN_CORPUS_DIR") {
            config.corpus_dir = PathBuf::from(corpus_dir);
        }

        if let Ok(snapshot_dir) = std::env::var("GOLDEN_SNAPSHOT_DIR") {
            config.snapshot_dir = PathBuf::from(snapshot_dir);
        }

        config.verbose = env_flag("GOLDEN_VERBOSE");
        if std::env::var_os("NO_COLOR").is_some() {
            config.diff_options.colored = false;
        }

        config
    }

    /// Config rooted at a single corpus directory, snapshots underneath it
    pub fn for_corpus(corpus_dir: impl Into<PathBuf>) -> Self {
        let corpus_dir = corpus_dir.into();
        Self {
            snapshot_dir: corpus_dir.join("snapshots"),
            corpus_dir,
            ..Self::default()
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Macro for defining golden tests
#[macro_export]
macro_rules! golden_test {
    ($name:ident, $test_path:expr) => {
        #[test]
        fn $name() {
            use $crate::{GoldenConfig, GoldenTestRunner};

            let config = GoldenConfig::from_env();
            let runner = GoldenTestRunner::new(config);

            if let Err(e) = runner.run_test($test_path) {
                panic!("Golden test failed: {}: {}", $test_path, e);
            }
        }
    };
    ($name:ident, $test_path:expr, $registry:expr) => {
        #[test]
        fn $name() {
            use $crate::{GoldenConfig, GoldenTestRunner};

            let config = GoldenConfig::from_env();
            let runner = GoldenTestRunner::new(config).with_registry($registry);

            if let Err(e) = runner.run_test($test_path) {
                panic!("Golden test failed: {}: {}", $test_path, e);
            }
        }
    };
}

/// Macro for batch golden tests
#[macro_export]
macro_rules! golden_test_batch {
    ($pattern:expr) => {
        #[test]
        fn golden_tests() {
            use $crate::{GoldenConfig, GoldenTestRunner};

            let config = GoldenConfig::from_env();
            let runner = GoldenTestRunner::new(config);

            if let Err(e) = runner.run_batch($pattern) {
                panic!("Golden test batch failed: {}: {}", $pattern, e);
            }
        }
    };
}
