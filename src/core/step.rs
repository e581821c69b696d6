//! Step domain model

use crate::core::config::StepConfig;
use crate::core::template;
use serde::Serialize;
use serde_json::{Map, Value};

/// Parameters passed to an action
pub type Params = Map<String, Value>;

/// A single step in a pipeline
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// Step name, used for reporting
    pub name: String,

    /// Job name, key into the action registry
    pub job: String,

    /// Whether the step runs at all
    pub enabled: bool,

    /// Parameters for a single invocation (templates resolved in place)
    pub params: Option<Params>,

    /// Expression naming the inputs list to fan out over
    pub params_list: Option<String>,
}

impl Step {
    /// Create a step from a step config
    pub fn from_config(config: &StepConfig) -> Self {
        Step {
            name: config.name.clone(),
            job: config.job.clone(),
            enabled: config.enabled,
            params: config.params.clone(),
            params_list: config.params_list.clone(),
        }
    }

    /// Whether this step fans out over a list from the inputs
    ///
    /// When both `params` and `params_list` are given, `params_list` wins.
    pub fn is_dynamic(&self) -> bool {
        self.params_list.is_some()
    }

    /// Inputs key named by `params_list`, if any
    pub fn params_list_key(&self) -> Option<String> {
        self.params_list.as_deref().map(template::list_key)
    }

    /// Parameters for a single invocation; an empty mapping when absent
    pub fn single_params(&self) -> Params {
        self.params.clone().unwrap_or_default()
    }
}
