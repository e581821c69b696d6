//! Pipeline execution engine

pub mod engine;
pub mod events;
pub mod executor;
pub mod validator;

pub use engine::{LoadedPipeline, PipelineEngine};
pub use events::{EventHandler, EventHandlers, ExecutionEvent};
pub use executor::PipelineExecutor;
pub use validator::PipelineValidator;
