//! Pipeline executor - runs steps in order, fails fast

use crate::{
    actions::{Action, ActionRegistry, ActionResult},
    core::{error::value_kind, Inputs, Params, Pipeline, PipelineError, RunStats, Step, StepResult},
    execution::events::{EventHandlers, ExecutionEvent},
    gateway::RegistryGateway,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Runs a validated, template-resolved pipeline
///
/// Steps run strictly in document order and each action call is awaited
/// before the next starts. The first failed step or iteration aborts the run.
pub struct PipelineExecutor {
    gateway: Arc<dyn RegistryGateway>,
    registry: Arc<ActionRegistry>,
    events: EventHandlers,
}

impl PipelineExecutor {
    pub fn new(gateway: Arc<dyn RegistryGateway>, registry: Arc<ActionRegistry>) -> Self {
        Self {
            gateway,
            registry,
            events: EventHandlers::new(),
        }
    }

    /// Share an event handler list with the caller
    pub fn with_events(mut self, events: EventHandlers) -> Self {
        self.events = events;
        self
    }

    /// Execute every step, recording results into `stats`
    ///
    /// Returns `Err` on the first failed step (`StepFailed`) or on a
    /// malformed `params_list` target; results recorded so far stay in `stats`.
    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        inputs: &Inputs,
        stats: &mut RunStats,
    ) -> Result<(), PipelineError> {
        for step in &pipeline.steps {
            if !step.enabled {
                info!("Skipping disabled step: {}", step.name);
                stats.record_skipped();
                self.events
                    .emit(ExecutionEvent::StepSkipped {
                        step: step.name.clone(),
                    })
                    .await;
                continue;
            }

            let result = self.execute_step(step, inputs).await?;
            let success = result.success;
            let message = result.message.clone();
            stats.record(result.clone());

            if success {
                self.events.emit(ExecutionEvent::StepCompleted { result }).await;
            } else {
                let message = message.unwrap_or_else(|| "action reported failure".to_string());
                error!("Step {} failed: {}", step.name, message);
                self.events
                    .emit(ExecutionEvent::StepFailed {
                        step: step.name.clone(),
                        error: message.clone(),
                    })
                    .await;
                return Err(PipelineError::StepFailed {
                    step: step.name.clone(),
                    message,
                });
            }
        }
        Ok(())
    }

    /// Run one enabled step and produce its result
    async fn execute_step(&self, step: &Step, inputs: &Inputs) -> Result<StepResult, PipelineError> {
        let action = self
            .registry
            .create(&step.job, self.gateway.clone())
            .ok_or_else(|| PipelineError::UnknownJob {
                step: step.name.clone(),
                job: step.job.clone(),
                allowed: self.registry.allowed_jobs(),
            })?;

        match step.params_list_key() {
            Some(key) => {
                let items = params_list(step, &key, inputs)?;
                Ok(self.fan_out(step, action.as_ref(), &items).await)
            }
            None => Ok(self.run_single(step, action.as_ref()).await),
        }
    }

    async fn run_single(&self, step: &Step, action: &dyn Action) -> StepResult {
        info!("Running step: {} (job: {})", step.name, step.job);
        self.events
            .emit(ExecutionEvent::StepStarted {
                step: step.name.clone(),
                job: step.job.clone(),
                iterations: None,
            })
            .await;

        let started = Instant::now();
        let params = step.single_params();
        debug!("Params for step {}: {:?}", step.name, params);
        let ActionResult { success, message, .. } = action.execute(&params).await;

        StepResult::new(&step.name, &step.job, success, message, started.elapsed())
    }

    /// Invoke the action once per item, in order, stopping at the first failure
    async fn fan_out(&self, step: &Step, action: &dyn Action, items: &[&Params]) -> StepResult {
        let total = items.len();
        info!("Running step: {} (job: {}) over {} item(s)", step.name, step.job, total);
        self.events
            .emit(ExecutionEvent::StepStarted {
                step: step.name.clone(),
                job: step.job.clone(),
                iterations: Some(total),
            })
            .await;

        let started = Instant::now();
        for (index, params) in items.iter().enumerate() {
            self.events
                .emit(ExecutionEvent::IterationStarted {
                    step: step.name.clone(),
                    index,
                    total,
                })
                .await;

            debug!("Params for step {} item {}: {:?}", step.name, index + 1, params);
            let result = action.execute(params).await;

            self.events
                .emit(ExecutionEvent::IterationFinished {
                    step: step.name.clone(),
                    index,
                    total,
                    success: result.success,
                    message: result.message.clone(),
                })
                .await;

            if !result.success {
                let reason = result
                    .message
                    .unwrap_or_else(|| "action reported failure".to_string());
                return StepResult::new(
                    &step.name,
                    &step.job,
                    false,
                    Some(format!("Item {} of {} failed: {}", index + 1, total, reason)),
                    started.elapsed(),
                );
            }
        }

        StepResult::new(
            &step.name,
            &step.job,
            true,
            Some(format!("{} item(s) processed", total)),
            started.elapsed(),
        )
    }
}

/// Resolve a step's `params_list` key to its parameter mappings
///
/// The whole list is checked before any item runs.
fn params_list<'a>(step: &Step, key: &str, inputs: &'a Inputs) -> Result<Vec<&'a Params>, PipelineError> {
    let invalid = |reason: String| PipelineError::InvalidParamsList {
        step: step.name.clone(),
        key: key.to_string(),
        reason,
    };

    let value = inputs
        .get(key)
        .ok_or_else(|| invalid("is not present in the inputs".to_string()))?;
    let items = match value {
        Value::Array(items) => items,
        other => return Err(invalid(format!("must be a list, got {}", value_kind(other)))),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(params) => Ok(params),
            other => Err(PipelineError::InvalidParamsItem {
                step: step.name.clone(),
                index,
                found: value_kind(other),
            }),
        })
        .collect()
}
