//! Persisted configuration snapshots
//!
//! The store holds two snapshots of the full configuration tree: the one
//! that was last committed and the one being committed now. Files may be
//! JSON or TOML; TOML is converted into the same JSON tree model.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::config::{ChangeDetector, SnapshotDiff};

/// Snapshot loading errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// Load a configuration tree from a JSON or TOML file
pub fn load_tree(path: &Path) -> Result<Value, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let parse_error = |message: String| StoreError::Parse {
        path: path.display().to_string(),
        message,
    };

    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    if is_toml {
        let toml_value: toml::Value =
            toml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?;
        Ok(toml_to_json(toml_value))
    } else {
        serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string()))
    }
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Committed and staged snapshots of the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotStore {
    committed: Value,
    staged: Value,
}

impl SnapshotStore {
    pub fn new(committed: Value, staged: Value) -> Self {
        Self { committed, staged }
    }

    /// Load both snapshots. A missing committed snapshot means nothing was
    /// committed yet and reads as an empty tree.
    pub fn load(staged: &Path, committed: Option<&Path>) -> Result<Self, StoreError> {
        let staged = load_tree(staged)?;
        let committed = match committed {
            Some(path) if path.exists() => load_tree(path)?,
            Some(path) => {
                debug!(path = %path.display(), "no committed snapshot, treating as empty");
                Value::Object(serde_json::Map::new())
            }
            None => Value::Object(serde_json::Map::new()),
        };
        Ok(Self::new(committed, staged))
    }

    /// The configuration being committed
    pub fn staged(&self) -> &Value {
        &self.staged
    }

    /// The configuration in effect before this commit
    pub fn committed(&self) -> &Value {
        &self.committed
    }
}

impl ChangeDetector for SnapshotStore {
    fn has_changed(&self, path: &[&str]) -> bool {
        SnapshotDiff::new(&self.committed, &self.staged).has_changed(path)
    }
}
