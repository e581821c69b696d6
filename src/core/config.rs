//! Pipeline configuration from YAML

use crate::core::{error::PipelineError, Pipeline};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Top-level pipeline document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Inputs document, relative to the pipeline file
    #[serde(default)]
    pub input_file: Option<String>,

    /// Steps in execution order
    pub pipeline: Vec<StepConfig>,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Step name, unique within the pipeline
    pub name: String,

    /// Job name, looked up in the action registry
    pub job: String,

    /// Disabled steps are recorded as skipped
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Parameters for a single invocation
    #[serde(default)]
    pub params: Option<serde_json::Map<String, serde_json::Value>>,

    /// Inputs key holding a list of parameter mappings, one invocation each
    #[serde(default)]
    pub params_list: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::PipelineNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Err(PipelineError::EmptyPipeline(path.to_path_buf()));
        }
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, PipelineError> {
        Self::parse(yaml, "pipeline document")
    }

    fn parse(yaml: &str, what: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig =
            serde_yaml::from_str(yaml).map_err(|source| PipelineError::Yaml {
                what: what.to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut seen = HashSet::new();
        for step in &self.pipeline {
            if !seen.insert(step.name.as_str()) {
                return Err(PipelineError::DuplicateStep(step.name.clone()));
            }
        }
        Ok(())
    }

    /// Resolve `input_file` against the directory holding the pipeline file
    pub fn inputs_path(&self, pipeline_file: &Path) -> Option<PathBuf> {
        self.input_file.as_ref().map(|input| {
            let input = Path::new(input);
            if input.is_absolute() {
                input.to_path_buf()
            } else {
                pipeline_file
                    .parent()
                    .unwrap_or_else(|| Path::new("."))
                    .join(input)
            }
        })
    }

    /// Convert config to a Pipeline domain model
    pub fn to_pipeline(&self, name: impl Into<String>) -> Pipeline {
        Pipeline::from_config(self, name)
    }
}
