//! Actions: one unit of work per job name
//!
//! Every action follows the same shape: parse and validate its params, check
//! that parent resources exist, call the gateway, and reclassify
//! "already in the target state" outcomes as success. [`Action::execute`]
//! always yields an [`ActionResult`]; failures never escape as errors.

pub mod ldap;
pub mod organization;
pub mod permission;
pub mod registry;
pub mod robot_account;
pub mod team;

use crate::core::step::Params;
use crate::gateway::{GatewayError, RegistryGateway};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

pub use registry::{ActionFactory, ActionRegistry};

/// Result of one action invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl ActionResult {
    /// Success with a result payload
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Success without a change: the target state already held
    pub fn noop(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// What a successful action did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The gateway call went through
    Done(Value),
    /// Nothing to do, or nothing found where that is acceptable
    Satisfied { message: String, data: Value },
}

impl Outcome {
    pub fn satisfied(message: impl Into<String>, data: Value) -> Self {
        Outcome::Satisfied {
            message: message.into(),
            data,
        }
    }
}

/// Reasons an action fails
#[derive(Debug, Error)]
pub enum ActionError {
    /// Params are missing or malformed
    #[error("{0}")]
    Validation(String),

    /// A parent resource does not exist
    #[error("{0}")]
    DependencyMissing(String),

    #[error("{context}: {source}")]
    Gateway {
        context: String,
        #[source]
        source: GatewayError,
    },

    /// Lookup found nothing
    #[error("{0}")]
    NotFound(String),
}

impl ActionError {
    pub fn gateway(context: impl Into<String>) -> impl FnOnce(GatewayError) -> ActionError {
        let context = context.into();
        move |source| ActionError::Gateway { context, source }
    }
}

/// A job implementation
#[async_trait]
pub trait Action: Send + Sync {
    /// Job name this action is registered under
    fn name(&self) -> &'static str;

    /// Do the work; errors become failed results in [`Action::execute`]
    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError>;

    /// Run the action and fold every outcome into an [`ActionResult`]
    async fn execute(&self, params: &Params) -> ActionResult {
        match self.perform(params).await {
            Ok(Outcome::Done(data)) => ActionResult::ok(data),
            Ok(Outcome::Satisfied { message, data }) => {
                info!("{}: {}", self.name(), message);
                ActionResult::noop(message, data)
            }
            Err(e) => {
                error!("{}: {}", self.name(), e);
                ActionResult::failed(e.to_string())
            }
        }
    }
}

/// Check that each field is present, non-null and, for strings, not blank
pub fn require_fields(params: &Params, fields: &[&str]) -> Result<(), ActionError> {
    for field in fields {
        let missing = match params.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(ActionError::Validation(format!(
                "Missing required field: '{}'",
                field
            )));
        }
    }
    Ok(())
}

/// Validate required fields, then deserialize params into a typed argument set
///
/// Unknown keys are ignored.
pub fn parse_params<T: DeserializeOwned>(params: &Params, required: &[&str]) -> Result<T, ActionError> {
    require_fields(params, required)?;
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| ActionError::Validation(format!("Invalid parameters: {}", e)))
}

pub(crate) async fn require_organization(
    gateway: &dyn RegistryGateway,
    organization: &str,
) -> Result<(), ActionError> {
    let exists = gateway
        .organization_exists(organization)
        .await
        .map_err(ActionError::gateway("Failed to check organization"))?;
    if exists {
        Ok(())
    } else {
        Err(ActionError::DependencyMissing(format!(
            "Organization '{}' does not exist",
            organization
        )))
    }
}

pub(crate) async fn require_team(
    gateway: &dyn RegistryGateway,
    organization: &str,
    team: &str,
) -> Result<(), ActionError> {
    require_organization(gateway, organization).await?;
    let exists = gateway
        .team_exists(organization, team)
        .await
        .map_err(ActionError::gateway("Failed to check team"))?;
    if exists {
        Ok(())
    } else {
        Err(ActionError::DependencyMissing(format!(
            "Team '{}' does not exist in organization '{}'",
            team, organization
        )))
    }
}
