//! Organization jobs

use crate::actions::{parse_params, Action, ActionError, Outcome};
use crate::core::step::Params;
use crate::gateway::{GatewayError, RegistryGateway};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct OrganizationArgs {
    name: String,
    #[serde(default)]
    email: Option<String>,
}

pub struct CreateOrganization {
    gateway: Arc<dyn RegistryGateway>,
}

impl CreateOrganization {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for CreateOrganization {
    fn name(&self) -> &'static str {
        "create_organization"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: OrganizationArgs = parse_params(params, &["name"])?;
        info!("Creating organization {}", args.name);

        match self
            .gateway
            .create_organization(&args.name, args.email.as_deref())
            .await
        {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": args.name,
                "result": result,
            }))),
            Err(GatewayError::AlreadyExists(_)) => Ok(Outcome::satisfied(
                format!("Organization '{}' already exists", args.name),
                json!({ "organization": args.name }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to create organization")(e)),
        }
    }
}

pub struct DeleteOrganization {
    gateway: Arc<dyn RegistryGateway>,
}

impl DeleteOrganization {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for DeleteOrganization {
    fn name(&self) -> &'static str {
        "delete_organization"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: OrganizationArgs = parse_params(params, &["name"])?;
        info!("Deleting organization {}", args.name);

        match self.gateway.delete_organization(&args.name).await {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": args.name,
                "result": result,
            }))),
            Err(GatewayError::NotFound(_)) => Ok(Outcome::satisfied(
                format!("Organization '{}' does not exist", args.name),
                json!({ "organization": args.name }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to delete organization")(e)),
        }
    }
}

pub struct GetOrganization {
    gateway: Arc<dyn RegistryGateway>,
}

impl GetOrganization {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for GetOrganization {
    fn name(&self) -> &'static str {
        "get_organization"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: OrganizationArgs = parse_params(params, &["name"])?;

        match self.gateway.get_organization(&args.name).await {
            Ok(result) => Ok(Outcome::Done(result)),
            Err(GatewayError::NotFound(_)) => Err(ActionError::NotFound(format!(
                "Organization '{}' not found",
                args.name
            ))),
            Err(e) => Err(ActionError::gateway("Failed to get organization")(e)),
        }
    }
}

pub struct ListOrganizations {
    gateway: Arc<dyn RegistryGateway>,
}

impl ListOrganizations {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for ListOrganizations {
    fn name(&self) -> &'static str {
        "list_organizations"
    }

    async fn perform(&self, _params: &Params) -> Result<Outcome, ActionError> {
        self.gateway
            .list_organizations()
            .await
            .map(Outcome::Done)
            .map_err(ActionError::gateway("Failed to list organizations"))
    }
}
