//! Execution events and their handlers

use crate::core::{ExecutionStatus, StepResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Events that occur during a run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        pipeline_name: String,
        total_steps: usize,
    },
    StepStarted {
        step: String,
        job: String,
        /// Number of iterations for a `params_list` step
        iterations: Option<usize>,
    },
    StepSkipped {
        step: String,
    },
    IterationStarted {
        step: String,
        index: usize,
        total: usize,
    },
    IterationFinished {
        step: String,
        index: usize,
        total: usize,
        success: bool,
        message: Option<String>,
    },
    StepCompleted {
        result: StepResult,
    },
    StepFailed {
        step: String,
        error: String,
    },
    PipelineCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Shared list of handlers
#[derive(Clone, Default)]
pub struct EventHandlers {
    handlers: Arc<Mutex<Vec<EventHandler>>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add<F>(&self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.handlers.lock().await.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    pub async fn emit(&self, event: ExecutionEvent) {
        let handlers = self.handlers.lock().await;
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }
}
