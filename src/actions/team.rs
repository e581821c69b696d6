//! Team and membership jobs

use crate::actions::{
    parse_params, require_organization, require_team, Action, ActionError, Outcome,
};
use crate::core::step::Params;
use crate::gateway::{GatewayError, RegistryGateway, TeamRole};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct TeamArgs {
    organization: String,
    team_name: String,
    #[serde(default)]
    role: TeamRole,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemberArgs {
    organization: String,
    team_name: String,
    member_name: String,
}

#[derive(Debug, Deserialize)]
struct InviteArgs {
    organization: String,
    team_name: String,
    email: String,
}

const TEAM_FIELDS: &[&str] = &["organization", "team_name"];
const MEMBER_FIELDS: &[&str] = &["organization", "team_name", "member_name"];
const INVITE_FIELDS: &[&str] = &["organization", "team_name", "email"];

pub struct CreateTeam {
    gateway: Arc<dyn RegistryGateway>,
}

impl CreateTeam {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for CreateTeam {
    fn name(&self) -> &'static str {
        "create_team"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: TeamArgs = parse_params(params, TEAM_FIELDS)?;
        let (org, team) = (args.organization.as_str(), args.team_name.as_str());
        info!("Creating team {}/{} with role {}", org, team, args.role);

        require_organization(self.gateway.as_ref(), org).await?;

        match self
            .gateway
            .create_team(org, team, args.role, args.description.as_deref())
            .await
        {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "role": args.role,
                "result": result,
            }))),
            Err(GatewayError::AlreadyExists(_)) => Ok(Outcome::satisfied(
                format!("Team '{}' already exists in organization '{}'", team, org),
                json!({ "organization": org, "team": team }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to create team")(e)),
        }
    }
}

pub struct DeleteTeam {
    gateway: Arc<dyn RegistryGateway>,
}

impl DeleteTeam {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for DeleteTeam {
    fn name(&self) -> &'static str {
        "delete_team"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: TeamArgs = parse_params(params, TEAM_FIELDS)?;
        let (org, team) = (args.organization.as_str(), args.team_name.as_str());
        info!("Deleting team {}/{}", org, team);

        require_organization(self.gateway.as_ref(), org).await?;

        let absent = || {
            Outcome::satisfied(
                format!("Team '{}' does not exist in organization '{}'", team, org),
                json!({ "organization": org, "team": team }),
            )
        };

        let exists = self
            .gateway
            .team_exists(org, team)
            .await
            .map_err(ActionError::gateway("Failed to check team"))?;
        if !exists {
            return Ok(absent());
        }

        match self.gateway.delete_team(org, team).await {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "result": result,
            }))),
            Err(GatewayError::NotFound(_)) => Ok(absent()),
            Err(e) => Err(ActionError::gateway("Failed to delete team")(e)),
        }
    }
}

pub struct GetTeam {
    gateway: Arc<dyn RegistryGateway>,
}

impl GetTeam {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for GetTeam {
    fn name(&self) -> &'static str {
        "get_team"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: TeamArgs = parse_params(params, TEAM_FIELDS)?;
        let (org, team) = (args.organization.as_str(), args.team_name.as_str());

        match self.gateway.get_team(org, team).await {
            Ok(result) => Ok(Outcome::Done(result)),
            Err(GatewayError::NotFound(_)) => Err(ActionError::NotFound(format!(
                "Team '{}' not found in organization '{}'",
                team, org
            ))),
            Err(e) => Err(ActionError::gateway("Failed to get team")(e)),
        }
    }
}

pub struct AddTeamMember {
    gateway: Arc<dyn RegistryGateway>,
}

impl AddTeamMember {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for AddTeamMember {
    fn name(&self) -> &'static str {
        "add_team_member"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: MemberArgs = parse_params(params, MEMBER_FIELDS)?;
        let (org, team, member) = (
            args.organization.as_str(),
            args.team_name.as_str(),
            args.member_name.as_str(),
        );
        info!("Adding {} to team {}/{}", member, org, team);

        require_team(self.gateway.as_ref(), org, team).await?;

        match self.gateway.add_team_member(org, team, member).await {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "member": member,
                "result": result,
            }))),
            Err(GatewayError::AlreadyExists(_)) => Ok(Outcome::satisfied(
                format!("'{}' is already a member of team '{}'", member, team),
                json!({ "organization": org, "team": team, "member": member }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to add team member")(e)),
        }
    }
}

pub struct RemoveTeamMember {
    gateway: Arc<dyn RegistryGateway>,
}

impl RemoveTeamMember {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for RemoveTeamMember {
    fn name(&self) -> &'static str {
        "remove_team_member"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: MemberArgs = parse_params(params, MEMBER_FIELDS)?;
        let (org, team, member) = (
            args.organization.as_str(),
            args.team_name.as_str(),
            args.member_name.as_str(),
        );
        info!("Removing {} from team {}/{}", member, org, team);

        require_team(self.gateway.as_ref(), org, team).await?;

        match self.gateway.remove_team_member(org, team, member).await {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "member": member,
                "result": result,
            }))),
            Err(GatewayError::NotFound(_)) => Ok(Outcome::satisfied(
                format!("'{}' is not a member of team '{}'", member, team),
                json!({ "organization": org, "team": team, "member": member }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to remove team member")(e)),
        }
    }
}

pub struct InviteTeamMember {
    gateway: Arc<dyn RegistryGateway>,
}

impl InviteTeamMember {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for InviteTeamMember {
    fn name(&self) -> &'static str {
        "invite_team_member"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: InviteArgs = parse_params(params, INVITE_FIELDS)?;
        let (org, team, email) = (
            args.organization.as_str(),
            args.team_name.as_str(),
            args.email.as_str(),
        );
        info!("Inviting {} to team {}/{}", email, org, team);

        require_team(self.gateway.as_ref(), org, team).await?;

        match self.gateway.invite_team_member(org, team, email).await {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "email": email,
                "result": result,
            }))),
            Err(GatewayError::AlreadyExists(_)) => Ok(Outcome::satisfied(
                format!("'{}' is already invited to team '{}'", email, team),
                json!({ "organization": org, "team": team, "email": email }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to invite team member")(e)),
        }
    }
}

pub struct DeleteTeamInvite {
    gateway: Arc<dyn RegistryGateway>,
}

impl DeleteTeamInvite {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for DeleteTeamInvite {
    fn name(&self) -> &'static str {
        "delete_team_invite"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: InviteArgs = parse_params(params, INVITE_FIELDS)?;
        let (org, team, email) = (
            args.organization.as_str(),
            args.team_name.as_str(),
            args.email.as_str(),
        );
        info!("Deleting invite for {} to team {}/{}", email, org, team);

        require_team(self.gateway.as_ref(), org, team).await?;

        match self.gateway.delete_team_invite(org, team, email).await {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "email": email,
                "result": result,
            }))),
            Err(GatewayError::NotFound(_)) => Ok(Outcome::satisfied(
                format!("No pending invite for '{}' to team '{}'", email, team),
                json!({ "organization": org, "team": team, "email": email }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to delete team invite")(e)),
        }
    }
}
