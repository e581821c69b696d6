//! quay-pipeline - a declarative task runner for Quay registry administration

pub mod actions;
pub mod cli;
pub mod core;
pub mod execution;
pub mod gateway;

// Re-export commonly used types
pub use actions::{Action, ActionRegistry, ActionResult};
pub use self::core::{ExecutionStatus, Inputs, Pipeline, PipelineError, RunStats, Step, StepResult};
pub use execution::{ExecutionEvent, LoadedPipeline, PipelineEngine};
pub use gateway::{GatewayConfig, GatewayError, QuayHttpGateway, RegistryGateway};
