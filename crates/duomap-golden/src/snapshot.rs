//! Snapshot management for golden tests

use crate::{GoldenError, Result};
use chrono::Utc;
use duomap_core::Path as MappingPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// A test snapshot containing expected transform output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Name of the test
    pub name: String,

    /// Test metadata
    pub metadata: SnapshotMetadata,

    /// The expected output
    pub content: Value,
}

/// Metadata about a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Version of the snapshot format
    pub version: String,

    /// When the snapshot was created
    pub created_at: String,

    /// When the snapshot was last updated
    pub updated_at: String,

    /// Description of what this tests
    pub description: Option<String>,

    /// Direction the output was produced in, as `from -> to`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Manages reading and writing snapshots
pub struct SnapshotManager {
    snapshot_dir: PathBuf,
}

impl SnapshotManager {
    /// Create a new snapshot manager
    pub fn new(snapshot_dir: impl AsRef<Path>) -> Self {
        Self {
            snapshot_dir: snapshot_dir.as_ref().to_path_buf(),
        }
    }

    /// Load a snapshot from disk
    pub fn load(&self, name: &str) -> Result<Snapshot> {
        let path = self.snapshot_path(name);

        if !path.exists() {
            return Err(GoldenError::CorpusError(format!(
                "Snapshot '{}' not found at {:?}",
                name, path
            )));
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save a snapshot to disk
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.snapshot_path(&snapshot.name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, content + "\n")?;

        Ok(())
    }

    /// Replace the content of an existing snapshot
    pub fn update(&self, name: &str, new_content: Value) -> Result<()> {
        let mut snapshot = self.load(name)?;

        snapshot.content = new_content;
        snapshot.metadata.updated_at = Utc::now().to_rfc3339();

        self.save(&snapshot)
    }

    /// Create a new snapshot
    pub fn create(
        &self,
        name: &str,
        content: Value,
        description: Option<String>,
        direction: Option<String>,
    ) -> Result<Snapshot> {
        let now = Utc::now().to_rfc3339();

        let snapshot = Snapshot {
            name: name.to_string(),
            metadata: SnapshotMetadata {
                version: "1.0.0".to_string(),
                created_at: now.clone(),
                updated_at: now,
                description,
                direction,
                tags: Vec::new(),
            },
            content,
        };

        self.save(&snapshot)?;
        Ok(snapshot)
    }

    /// Check if a snapshot exists
    pub fn exists(&self, name: &str) -> bool {
        self.snapshot_path(name).exists()
    }

    /// List snapshot names, including their category prefix
    pub fn list(&self) -> Result<Vec<String>> {
        let mut snapshots = Vec::new();

        if !self.snapshot_dir.exists() {
            return Ok(snapshots);
        }

        for entry in walkdir::WalkDir::new(&self.snapshot_dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Ok(relative) = path.with_extension("").strip_prefix(&self.snapshot_dir) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                snapshots.push(name);
            }
        }

        snapshots.sort();
        Ok(snapshots)
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        let filename = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{}.json", name)
        };

        self.snapshot_dir.join(filename)
    }

    /// Create a backup of a snapshot before updating
    pub fn backup(&self, name: &str) -> Result<()> {
        let source = self.snapshot_path(name);

        if !source.exists() {
            return Ok(());
        }

        let backup_path = source.with_extension(format!("json.backup.{}", Utc::now().timestamp()));
        fs::copy(source, backup_path)?;
        Ok(())
    }
}

/// Normalize JSON for comparison
///
/// Mapping keys are sorted and floats rounded; strings are left alone since
/// whitespace is part of a mapped value.
pub fn normalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by_key(|(k, _)| k.as_str());
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, val)| (key.clone(), normalize_json(val)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(normalize_json).collect()),
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .and_then(|f| serde_json::Number::from_f64((f * 1_000_000.0).round() / 1_000_000.0))
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        _ => value.clone(),
    }
}

/// Remove every ignored field from a JSON value
pub fn apply_ignores(value: &mut Value, ignore_fields: &[MappingPath]) {
    for path in ignore_fields {
        crate::select::remove(value, path);
    }
}
