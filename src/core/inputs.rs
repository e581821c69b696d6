//! Pipeline inputs - values referenced by templates and params lists

use crate::core::error::{value_kind, PipelineError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Inputs document loaded once per run
///
/// Read-only during execution; templates and `params_list` look values up by
/// top-level key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs {
    values: Map<String, Value>,
}

impl Inputs {
    /// Create an empty inputs document
    pub fn new() -> Self {
        Self::default()
    }

    /// Load inputs from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::InputsNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse inputs from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, PipelineError> {
        Self::parse(yaml, "inputs document")
    }

    fn parse(yaml: &str, what: &str) -> Result<Self, PipelineError> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: Value = serde_yaml::from_str(yaml).map_err(|source| PipelineError::Yaml {
            what: what.to_string(),
            source,
        })?;
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(values) => Ok(Self { values }),
            other => Err(PipelineError::InputsNotMapping(value_kind(&other))),
        }
    }

    /// Get a value by top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a value, replacing any existing one
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate keys and values in document order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl From<Map<String, Value>> for Inputs {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}
