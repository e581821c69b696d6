//! Repository permission and default permission (prototype) jobs

use crate::actions::{
    parse_params, require_organization, require_team, Action, ActionError, Outcome,
};
use crate::core::step::Params;
use crate::gateway::{Delegate, GatewayError, Permission, RegistryGateway};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RepositoryArgs {
    organization: String,
    team_name: String,
    repository: String,
    #[serde(default)]
    permission: Permission,
}

#[derive(Debug, Deserialize)]
struct PrototypeArgs {
    organization: String,
    delegate: Delegate,
    #[serde(default)]
    role: Option<Permission>,
    #[serde(default)]
    activating_user: Option<String>,
}

const REPOSITORY_FIELDS: &[&str] = &["organization", "team_name", "repository"];
const PROTOTYPE_FIELDS: &[&str] = &["organization", "delegate"];

/// Prototype entries from a list response; accepts a bare list or `{"prototypes": [...]}`
fn prototype_entries(response: &Value) -> &[Value] {
    match response {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("prototypes")
            .and_then(|v| v.as_array())
            .map(|v| v.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    }
}

fn prototype_id(entry: &Value) -> Option<String> {
    match entry.get("id").or_else(|| entry.get("prototypes_id"))? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Whether a prototype entry targets the delegate, and the role when one is given
fn matches_prototype(entry: &Value, delegate: &Delegate, role: Option<Permission>) -> bool {
    let target = &entry["delegate"];
    if target["name"].as_str() != Some(delegate.name.as_str())
        || target["kind"].as_str() != Some(delegate.kind.to_string().as_str())
    {
        return false;
    }
    match role {
        Some(role) => entry["role"].as_str() == Some(role.to_string().as_str()),
        None => true,
    }
}

pub struct SetTeamRepositoryPermission {
    gateway: Arc<dyn RegistryGateway>,
}

impl SetTeamRepositoryPermission {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for SetTeamRepositoryPermission {
    fn name(&self) -> &'static str {
        "set_team_repository_permission"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: RepositoryArgs = parse_params(params, REPOSITORY_FIELDS)?;
        let (org, team, repo) = (
            args.organization.as_str(),
            args.team_name.as_str(),
            args.repository.as_str(),
        );
        info!("Granting {} on {}/{} to team {}", args.permission, org, repo, team);

        require_team(self.gateway.as_ref(), org, team).await?;

        let result = self
            .gateway
            .set_team_repository_permission(org, team, repo, args.permission)
            .await
            .map_err(ActionError::gateway("Failed to set team repository permission"))?;

        Ok(Outcome::Done(json!({
            "organization": org,
            "team": team,
            "repository": repo,
            "permission": args.permission,
            "result": result,
        })))
    }
}

pub struct RemoveTeamRepositoryPermission {
    gateway: Arc<dyn RegistryGateway>,
}

impl RemoveTeamRepositoryPermission {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for RemoveTeamRepositoryPermission {
    fn name(&self) -> &'static str {
        "remove_team_repository_permission"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: RepositoryArgs = parse_params(params, REPOSITORY_FIELDS)?;
        let (org, team, repo) = (
            args.organization.as_str(),
            args.team_name.as_str(),
            args.repository.as_str(),
        );
        info!("Revoking team {} permission on {}/{}", team, org, repo);

        require_team(self.gateway.as_ref(), org, team).await?;

        match self
            .gateway
            .remove_team_repository_permission(org, team, repo)
            .await
        {
            Ok(result) => Ok(Outcome::Done(json!({
                "organization": org,
                "team": team,
                "repository": repo,
                "result": result,
            }))),
            Err(GatewayError::NotFound(_)) => Ok(Outcome::satisfied(
                format!("Team '{}' has no permission on repository '{}'", team, repo),
                json!({ "organization": org, "team": team, "repository": repo }),
            )),
            Err(e) => Err(ActionError::gateway("Failed to remove team repository permission")(e)),
        }
    }
}

pub struct SetDefaultRepositoryPermission {
    gateway: Arc<dyn RegistryGateway>,
}

impl SetDefaultRepositoryPermission {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for SetDefaultRepositoryPermission {
    fn name(&self) -> &'static str {
        "set_default_repository_permission"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: PrototypeArgs = parse_params(params, PROTOTYPE_FIELDS)?;
        let org = args.organization.as_str();
        let role = args.role.unwrap_or_default();
        info!(
            "Setting default {} permission in {} for {} {}",
            role, org, args.delegate.kind, args.delegate.name
        );

        require_organization(self.gateway.as_ref(), org).await?;

        let prototypes = self
            .gateway
            .list_prototypes(org)
            .await
            .map_err(ActionError::gateway("Failed to list default permissions"))?;
        let duplicates: Vec<Value> = prototype_entries(&prototypes)
            .iter()
            .filter(|entry| matches_prototype(entry, &args.delegate, Some(role)))
            .map(|entry| prototype_id(entry).map(Value::String).unwrap_or_else(|| entry.clone()))
            .collect();

        if !duplicates.is_empty() {
            return Ok(Outcome::satisfied(
                "Default permission prototype already exists",
                json!({
                    "organization": org,
                    "delegate": args.delegate,
                    "role": role,
                    "prototypes": duplicates,
                }),
            ));
        }

        let result = self
            .gateway
            .create_prototype(org, &args.delegate, role, args.activating_user.as_deref())
            .await
            .map_err(ActionError::gateway("Failed to set default repository permission"))?;

        Ok(Outcome::Done(json!({
            "organization": org,
            "delegate": args.delegate,
            "role": role,
            "activating_user": args.activating_user,
            "result": result,
        })))
    }
}

pub struct RemoveDefaultRepositoryPermission {
    gateway: Arc<dyn RegistryGateway>,
}

impl RemoveDefaultRepositoryPermission {
    pub fn new(gateway: Arc<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Action for RemoveDefaultRepositoryPermission {
    fn name(&self) -> &'static str {
        "remove_default_repository_permission"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        let args: PrototypeArgs = parse_params(params, PROTOTYPE_FIELDS)?;
        let org = args.organization.as_str();
        info!(
            "Removing default permissions in {} for {} {} (role: {})",
            org,
            args.delegate.kind,
            args.delegate.name,
            args.role.map_or_else(|| "any".to_string(), |r| r.to_string())
        );

        require_organization(self.gateway.as_ref(), org).await?;

        let prototypes = self
            .gateway
            .list_prototypes(org)
            .await
            .map_err(ActionError::gateway("Failed to list default permissions"))?;
        let matches: Vec<String> = prototype_entries(&prototypes)
            .iter()
            .filter(|entry| matches_prototype(entry, &args.delegate, args.role))
            .filter_map(prototype_id)
            .collect();

        if matches.is_empty() {
            return Ok(Outcome::satisfied(
                "No matching default permission prototypes exist",
                json!({ "organization": org, "delegate": args.delegate, "role": args.role }),
            ));
        }

        let mut removed = Vec::with_capacity(matches.len());
        for id in matches {
            let result = self
                .gateway
                .delete_prototype(org, &id)
                .await
                .map_err(ActionError::gateway("Failed to remove default repository permission"))?;
            removed.push(json!({ "prototype_id": id, "result": result }));
        }

        Ok(Outcome::Done(json!({
            "organization": org,
            "delegate": args.delegate,
            "role": args.role,
            "removed": removed,
        })))
    }
}
