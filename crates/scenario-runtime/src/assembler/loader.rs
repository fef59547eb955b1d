//! # Config Loaders
//!
//! Source of raw nested mappings: the scenario file itself and every
//! sub-tree it imports through `nodesetPath`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use scenario_types::{ScenarioError, ScenarioResult};
use tracing::debug;

/// Reads a nested mapping from a path.
pub trait ConfigLoader {
    fn load(&self, path: &str) -> ScenarioResult<Value>;

    /// Stable identity of `path`, used to detect import cycles.
    fn canonical(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Loads YAML files from disk. Relative paths resolve against `base_dir`.
#[derive(Debug, Clone, Default)]
pub struct YamlFileLoader {
    base_dir: Option<PathBuf>,
}

impl YamlFileLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let raw = Path::new(path);
        match &self.base_dir {
            Some(base) if raw.is_relative() => base.join(raw),
            _ => raw.to_path_buf(),
        }
    }
}

impl ConfigLoader for YamlFileLoader {
    fn load(&self, path: &str) -> ScenarioResult<Value> {
        let resolved = self.resolve(path);
        debug!(path = %resolved.display(), "[Loader] Reading scenario file");

        let text = fs::read_to_string(&resolved).map_err(|e| ScenarioError::Load {
            path: resolved.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_yaml::from_str::<Value>(&text).map_err(|e| ScenarioError::Load {
            path: resolved.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn canonical(&self, path: &str) -> String {
        let resolved = self.resolve(path);
        fs::canonicalize(&resolved)
            .unwrap_or(resolved)
            .display()
            .to_string()
    }
}

/// Serves documents registered in memory. Used by tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    documents: HashMap<String, Value>,
}

impl InMemoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, document: Value) -> &mut Self {
        self.documents.insert(path.into(), document);
        self
    }

    /// Parse `yaml` and register it under `path`.
    pub fn insert_yaml(&mut self, path: impl Into<String>, yaml: &str) -> ScenarioResult<&mut Self> {
        let path = path.into();
        let document = serde_yaml::from_str::<Value>(yaml).map_err(|e| ScenarioError::Load {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(self.insert(path, document))
    }
}

impl ConfigLoader for InMemoryLoader {
    fn load(&self, path: &str) -> ScenarioResult<Value> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| ScenarioError::Load {
                path: path.to_string(),
                reason: "no such document".to_string(),
            })
    }
}
