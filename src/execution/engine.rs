//! Pipeline engine - load, resolve, validate, execute

use crate::{
    actions::ActionRegistry,
    core::{config::PipelineConfig, template, Inputs, Pipeline, PipelineError, RunStats},
    execution::{
        events::{EventHandlers, ExecutionEvent},
        executor::PipelineExecutor,
        validator::PipelineValidator,
    },
    gateway::RegistryGateway,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// A pipeline ready to run: templates resolved, jobs validated
#[derive(Debug, Clone)]
pub struct LoadedPipeline {
    pub pipeline: Pipeline,
    pub inputs: Inputs,
    /// Inputs file actually read, if any
    pub inputs_file: Option<PathBuf>,
}

impl LoadedPipeline {
    /// Read a pipeline file and its inputs, then resolve and validate
    ///
    /// `inputs_override` replaces the document's `input_file`.
    pub fn load(
        pipeline_file: &Path,
        inputs_override: Option<&Path>,
        registry: &ActionRegistry,
    ) -> Result<Self, PipelineError> {
        info!("Loading pipeline from {}", pipeline_file.display());
        let config = PipelineConfig::from_file(pipeline_file)?;

        let inputs_file = inputs_override
            .map(Path::to_path_buf)
            .or_else(|| config.inputs_path(pipeline_file));
        let inputs = match &inputs_file {
            Some(path) => {
                info!("Loading inputs from {}", path.display());
                Inputs::from_file(path)?
            }
            None => Inputs::new(),
        };

        let name = pipeline_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pipeline".to_string());

        let mut loaded = Self::prepare(&config, name, inputs, registry)?;
        loaded.inputs_file = inputs_file;
        Ok(loaded)
    }

    /// Resolve templates and validate an already parsed document
    pub fn prepare(
        config: &PipelineConfig,
        name: impl Into<String>,
        inputs: Inputs,
        registry: &ActionRegistry,
    ) -> Result<Self, PipelineError> {
        let mut pipeline = config.to_pipeline(name);
        template::resolve_pipeline(&mut pipeline, &inputs);
        PipelineValidator::new(registry).validate(&pipeline)?;

        Ok(Self {
            pipeline,
            inputs,
            inputs_file: None,
        })
    }
}

/// Owns the run lifecycle
pub struct PipelineEngine {
    registry: Arc<ActionRegistry>,
    executor: PipelineExecutor,
    events: EventHandlers,
}

impl PipelineEngine {
    pub fn new(gateway: Arc<dyn RegistryGateway>, registry: Arc<ActionRegistry>) -> Self {
        let events = EventHandlers::new();
        let executor = PipelineExecutor::new(gateway, registry.clone()).with_events(events.clone());
        Self {
            registry,
            executor,
            events,
        }
    }

    /// Engine with every built-in job
    pub fn with_builtin_jobs(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self::new(gateway, Arc::new(ActionRegistry::builtin()))
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Add an event handler
    pub async fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.events.add(handler).await;
    }

    pub fn load(
        &self,
        pipeline_file: &Path,
        inputs_override: Option<&Path>,
    ) -> Result<LoadedPipeline, PipelineError> {
        LoadedPipeline::load(pipeline_file, inputs_override, &self.registry)
    }

    /// Execute a loaded pipeline
    ///
    /// Always returns the run statistics; an aborted run carries the reason
    /// in `RunStats::error`.
    pub async fn run(&self, loaded: &LoadedPipeline) -> RunStats {
        let pipeline = &loaded.pipeline;
        let mut stats = RunStats::new();
        stats.start(pipeline.steps.len());

        info!(
            "Starting pipeline execution: {} ({})",
            pipeline.name, stats.execution_id
        );
        self.events
            .emit(ExecutionEvent::PipelineStarted {
                execution_id: stats.execution_id,
                pipeline_name: pipeline.name.clone(),
                total_steps: pipeline.steps.len(),
            })
            .await;

        match self.executor.execute(pipeline, &loaded.inputs, &mut stats).await {
            Ok(()) => stats.complete(),
            Err(e) => {
                error!("Pipeline {} aborted: {}", pipeline.name, e);
                stats.fail(e.to_string());
            }
        }

        info!(
            "Pipeline {} finished: {:?} ({} succeeded, {} failed, {} skipped)",
            pipeline.name, stats.status, stats.successful, stats.failed, stats.skipped
        );
        self.events
            .emit(ExecutionEvent::PipelineCompleted {
                execution_id: stats.execution_id,
                status: stats.status,
            })
            .await;

        stats
    }

    /// Load then run; load errors are reported through the returned stats
    pub async fn run_file(&self, pipeline_file: &Path, inputs_override: Option<&Path>) -> RunStats {
        match self.load(pipeline_file, inputs_override) {
            Ok(loaded) => self.run(&loaded).await,
            Err(e) => {
                error!("Failed to load pipeline {}: {}", pipeline_file.display(), e);
                let mut stats = RunStats::new();
                stats.start(0);
                stats.fail(e.to_string());
                stats
            }
        }
    }
}
