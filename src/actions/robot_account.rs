//! Robot account jobs

use crate::actions::{parse_params, require_organization, Action, ActionError, Outcome};
use crate::core::step::Params;
use crate::gateway::{GatewayError, RegistryGateway};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct RobotArgs {
    organization: String,
    robot_shortname: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganizationArgs {
    organization: String,
}

const ROBOT_FIELDS: &[&str] = &["organization", "robot_shortname"];

/// Full robot name as the registry reports it
fn robot_name(organization: &str, shortname: &str) -> String {
    format!("{}+{}", organization, shortname)
}

pub struct CreateRobotAccount {
    gateway: Arc<dyn RegistryGateway>,
}

impl CreateRobotAccount {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for CreateRobotAccount {
    fn name(&self) -> &'static str {
        "create_robot_account"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: RobotArgs = parse_params(params, ROBOT_FIELDS)?;
        let org = args.organization.as_str();
        let robot = robot_name(org, &args.robot_shortname);
        info!("Creating robot account {}", robot);

        require_organization(self.gateway.as_ref(), org).await?;

        match self
            .gateway
            .create_robot_account(org, &args.robot_shortname, args.description.as_deref())
            .await
        {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "robot": robot,
                "result": result,
            }))),
            Err(GatewayError::AlreadyExists(_)) => Ok(Outcome::satisfied(
                format!("Robot account '{}' already exists", robot),
                json!({ "organization": org, "robot": robot }),
            )),
            Err(GatewayError::PreconditionFailed(reason)) => {
                warn!("Robot pre-check rejected {} ({}), treating as created", robot, reason);
                Ok(Outcome::Done(json!({
                    "organization": org,
                    "robot": robot,
                    "created": true,
                    "reason": "precheck_missing",
                })))
            }
            Err(e) => Err(ActionError::gateway("Failed to create robot account")(e)),
        }
    }
}

pub struct DeleteRobotAccount {
    gateway: Arc<dyn RegistryGateway>,
}

impl DeleteRobotAccount {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for DeleteRobotAccount {
    fn name(&self) -> &'static str {
        "delete_robot_account"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: RobotArgs = parse_params(params, ROBOT_FIELDS)?;
        let org = args.organization.as_str();
        let robot = robot_name(org, &args.robot_shortname);
        info!("Deleting robot account {}", robot);

        match self.gateway.delete_robot_account(org, &args.robot_shortname).await {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "robot": robot,
                "result": result,
            }))),
            Err(GatewayError::NotFound(_)) => Ok(Outcome::satisfied(
                format!("Robot account '{}' does not exist", robot),
                json!({ "organization": org, "robot": robot }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to delete robot account")(e)),
        }
    }
}

pub struct GetRobotAccount {
    gateway: Arc<dyn RegistryGateway>,
}

impl GetRobotAccount {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for GetRobotAccount {
    fn name(&self) -> &'static str {
        "get_robot_account"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: RobotArgs = parse_params(params, ROBOT_FIELDS)?;
        let org = args.organization.as_str();

        match self.gateway.get_robot_account(org, &args.robot_shortname).await {
            Ok(result) => Ok(Outcome::Done(result)),
            Err(GatewayError::NotFound(_)) => Err(ActionError::NotFound(format!(
                "Robot account '{}' not found",
                robot_name(org, &args.robot_shortname)
            ))),
            Err(e) => Err(ActionError::gateway("Failed to get robot account")(e)),
        }
    }
}

pub struct ListRobotAccounts {
    gateway: Arc<dyn RegistryGateway>,
}

impl ListRobotAccounts {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for ListRobotAccounts {
    fn name(&self) -> &'static str {
        "list_robot_accounts"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: OrganizationArgs = parse_params(params, &["organization"])?;

        match self.gateway.list_robot_accounts(&args.organization).await {
            Ok(result) => Ok(Outcome::Done(result)),
            Err(GatewayError::NotFound(_)) => Err(ActionError::NotFound(format!(
                "Organization '{}' not found",
                args.organization
            ))),
            Err(e) => Err(ActionError::gateway("Failed to list robot accounts")(e)),
        }
    }
}
