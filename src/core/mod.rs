//! Core domain models
//!
//! Pipeline documents, inputs, template resolution, settings and the
//! statistics a run produces.

pub mod config;
pub mod error;
pub mod inputs;
pub mod pipeline;
pub mod settings;
pub mod state;
pub mod step;
pub mod template;

pub use error::PipelineError;
pub use inputs::Inputs;
pub use pipeline::*;
pub use state::*;
pub use step::*;
