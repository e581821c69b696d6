//! Pipeline error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline load or run
///
/// Everything except [`PipelineError::StepFailed`] is a configuration error:
/// the documents themselves are wrong and re-running will not help.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Pipeline file not found: {0}")]
    PipelineNotFound(PathBuf),

    #[error("Inputs file not found: {0}")]
    InputsNotFound(PathBuf),

    #[error("Pipeline file is empty: {0}")]
    EmptyPipeline(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {what}: {source}")]
    Yaml {
        what: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Inputs document must be a mapping, got {0}")]
    InputsNotMapping(&'static str),

    #[error("Duplicate step name: {0}")]
    DuplicateStep(String),

    #[error("Invalid job '{job}' in step '{step}'. Allowed jobs: {allowed}")]
    UnknownJob {
        step: String,
        job: String,
        allowed: String,
    },

    #[error("Invalid params list for step '{step}': key '{key}' {reason}")]
    InvalidParamsList {
        step: String,
        key: String,
        reason: String,
    },

    #[error("Invalid params in dynamic list for step '{step}': item {index} is {found}, expected a mapping")]
    InvalidParamsItem {
        step: String,
        index: usize,
        found: &'static str,
    },

    #[error("Step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },
}

impl PipelineError {
    /// Whether this error comes from the documents rather than from a step
    pub fn is_configuration(&self) -> bool {
        !matches!(self, PipelineError::StepFailed { .. })
    }
}

/// Human-readable name of a JSON value's type, used in error messages
pub fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}
