//! Pipeline domain model

use crate::core::{config::PipelineConfig, step::Step};
use serde::Serialize;

/// A pipeline definition: steps in document order
#[derive(Debug, Clone, Serialize)]
pub struct Pipeline {
    /// Pipeline name (the file stem when loaded from disk)
    pub name: String,

    /// Steps in execution order
    pub steps: Vec<Step>,
}

impl Pipeline {
    /// Create a pipeline from configuration
    pub fn from_config(config: &PipelineConfig, name: impl Into<String>) -> Self {
        Pipeline {
            name: name.into(),
            steps: config.pipeline.iter().map(Step::from_config).collect(),
        }
    }

    /// Get a step by name
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn enabled_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.enabled)
    }

    pub fn disabled_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| !s.enabled)
    }
}
