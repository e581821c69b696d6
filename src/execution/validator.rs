//! Pipeline validation against the action registry

use crate::actions::ActionRegistry;
use crate::core::{Pipeline, PipelineError};
use tracing::debug;

/// Rejects pipelines that reference unknown jobs
pub struct PipelineValidator<'a> {
    registry: &'a ActionRegistry,
}

impl<'a> PipelineValidator<'a> {
    pub fn new(registry: &'a ActionRegistry) -> Self {
        Self { registry }
    }

    /// Check every step's job, disabled steps included; stops at the first unknown job
    pub fn validate(&self, pipeline: &Pipeline) -> Result<(), PipelineError> {
        for step in &pipeline.steps {
            if !self.registry.contains(&step.job) {
                return Err(PipelineError::UnknownJob {
                    step: step.name.clone(),
                    job: step.job.clone(),
                    allowed: self.registry.allowed_jobs(),
                });
            }
        }
        debug!("Pipeline {} validated ({} steps)", pipeline.name, pipeline.steps.len());
        Ok(())
    }
}
