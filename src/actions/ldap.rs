//! Team LDAP sync jobs

use crate::actions::{parse_params, require_team, Action, ActionError, Outcome};
use crate::core::step::Params;
use crate::gateway::{GatewayError, RegistryGateway};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct SyncArgs {
    organization: String,
    team_name: String,
    group_dn: String,
}

#[derive(Debug, Deserialize)]
struct TeamArgs {
    organization: String,
    team_name: String,
}

const TEAM_FIELDS: &[&str] = &["organization", "team_name"];

pub struct SyncTeamLdap {
    gateway: Arc<dyn RegistryGateway>,
}

impl SyncTeamLdap {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for SyncTeamLdap {
    fn name(&self) -> &'static str {
        "sync_team_ldap"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: SyncArgs = parse_params(params, &["organization", "team_name", "group_dn"])?;
        let (org, team, group_dn) = (
            args.organization.as_str(),
            args.team_name.as_str(),
            args.group_dn.as_str(),
        );
        info!("Syncing team {}/{} with {}", org, team, group_dn);

        require_team(self.gateway.as_ref(), org, team).await?;

        let already = || {
            Outcome::satisfied(
                format!("Team '{}' is already synced with {}", team, group_dn),
                json!({ "organization": org, "team": team, "group_dn": group_dn }),
            )
        };

        // DN the team is currently bound to, when the status lookup tells us
        let bound = match self.gateway.get_team_sync_status(org, team).await {
            Ok(status) => {
                let current = status.get("group_dn").and_then(|v| v.as_str()).map(str::to_string);
                if current.as_deref() == Some(group_dn) {
                    return Ok(already());
                }
                current
            }
            Err(GatewayError::NotFound(_)) => {
                debug!("Team {}/{} is not synced yet", org, team);
                None
            }
            Err(e) => {
                warn!("Could not read sync status for team {}/{}, syncing anyway: {}", org, team, e);
                None
            }
        };

        match self.gateway.sync_team_ldap(org, team, group_dn).await {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "group_dn": group_dn,
                "result": result,
            }))),
            Err(e @ GatewayError::AlreadyExists(_)) => match bound {
                None => Ok(already()),
                Some(current) => Err(ActionError::gateway(format!(
                    "Team '{}' is already synced with {}, not {}",
                    team, current, group_dn
                ))(e)),
            },
            Err(e) => Err(ActionError::gateway("Failed to sync team with LDAP")(e)),
        }
    }
}

pub struct UnsyncTeamLdap {
    gateway: Arc<dyn RegistryGateway>,
}

impl UnsyncTeamLdap {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for UnsyncTeamLdap {
    fn name(&self) -> &'static str {
        "unsync_team_ldap"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: TeamArgs = parse_params(params, TEAM_FIELDS)?;
        let (org, team) = (args.organization.as_str(), args.team_name.as_str());
        info!("Removing LDAP sync from team {}/{}", org, team);

        require_team(self.gateway.as_ref(), org, team).await?;

        match self.gateway.unsync_team_ldap(org, team).await {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "result": result,
            }))),
            Err(GatewayError::NotFound(_)) => Ok(Outcome::satisfied(
                format!("Team '{}' is not synced with LDAP", team),
                json!({ "organization": org, "team": team }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to unsync team from LDAP")(e)),
        }
    }
}

pub struct GetTeamSyncStatus {
    gateway: Arc<dyn RegistryGateway>,
}

impl GetTeamSyncStatus {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for GetTeamSyncStatus {
    fn name(&self) -> &'static str {
        "get_team_sync_status"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: TeamArgs = parse_params(params, TEAM_FIELDS)?;
        let (org, team) = (args.organization.as_str(), args.team_name.as_str());

        require_team(self.gateway.as_ref(), org, team).await?;

        match self.gateway.get_team_sync_status(org, team).await {
            Ok(status) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "status": status,
            }))),
            Err(GatewayError::NotFound(_)) => Ok(Outcome::satisfied(
                "Team has no LDAP sync configured",
                json!({ "organization": org, "team": team }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to get team sync status")(e)),
        }
    }
}
