//! Test utilities for quay-pipeline scenarios

#![allow(dead_code)]

use async_trait::async_trait;
use quay_pipeline::actions::{Action, ActionError, ActionRegistry, Outcome};
use quay_pipeline::core::config::PipelineConfig;
use quay_pipeline::core::step::Params;
use quay_pipeline::core::{ExecutionStatus, Inputs, PipelineError, RunStats};
use quay_pipeline::execution::{LoadedPipeline, PipelineEngine};
use quay_pipeline::gateway::{
    Delegate, GatewayError, GatewayResult, Permission, RegistryGateway, TeamRole,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// In-memory registry recording every gateway call as `op org/name...`
#[derive(Default)]
pub struct MockGateway {
    organizations: Mutex<BTreeSet<String>>,
    robots: Mutex<BTreeSet<String>>,
    teams: Mutex<BTreeMap<String, BTreeSet<String>>>,
    syncs: Mutex<BTreeMap<String, String>>,
    calls: Mutex<Vec<String>>,
    /// Operation name that answers with a server error
    failing_op: Mutex<Option<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_org(self, org: &str) -> Self {
        self.organizations.lock().unwrap().insert(org.to_string());
        self
    }

    pub fn with_team(self, org: &str, team: &str) -> Self {
        self.teams
            .lock()
            .unwrap()
            .insert(format!("{}/{}", org, team), BTreeSet::new());
        self
    }

    /// Every call to `op` fails with HTTP 500
    pub fn failing(self, op: &str) -> Self {
        *self.failing_op.lock().unwrap() = Some(op.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose operation name is `op`
    pub fn calls_to(&self, op: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .collect()
    }

    pub fn has_org(&self, org: &str) -> bool {
        self.organizations.lock().unwrap().contains(org)
    }

    pub fn has_team(&self, org: &str, team: &str) -> bool {
        self.teams
            .lock()
            .unwrap()
            .contains_key(&format!("{}/{}", org, team))
    }

    pub fn has_robot(&self, org: &str, shortname: &str) -> bool {
        self.robots
            .lock()
            .unwrap()
            .contains(&format!("{}+{}", org, shortname))
    }

    fn record(&self, op: &str, target: String) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(format!("{} {}", op, target));
        if self.failing_op.lock().unwrap().as_deref() == Some(op) {
            return Err(GatewayError::Api {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryGateway for MockGateway {
    async fn create_organization(&self, name: &str, _email: Option<&str>) -> GatewayResult {
        self.record("create_organization", name.to_string())?;
        if !self.organizations.lock().unwrap().insert(name.to_string()) {
            return Err(GatewayError::AlreadyExists(
                "A user or organization with this name already exists".to_string(),
            ));
        }
        Ok(json!({ "name": name }))
    }

    async fn delete_organization(&self, name: &str) -> GatewayResult {
        self.record("delete_organization", name.to_string())?;
        if !self.organizations.lock().unwrap().remove(name) {
            return Err(GatewayError::NotFound("Not Found".to_string()));
        }
        Ok(json!({}))
    }

    async fn get_organization(&self, name: &str) -> GatewayResult {
        self.record("get_organization", name.to_string())?;
        if self.has_org(name) {
            Ok(json!({ "name": name }))
        } else {
            Err(GatewayError::NotFound("Not Found".to_string()))
        }
    }

    async fn list_organizations(&self) -> GatewayResult {
        self.record("list_organizations", String::new())?;
        let names: Vec<String> = self.organizations.lock().unwrap().iter().cloned().collect();
        Ok(json!({ "organizations": names }))
    }

    async fn create_robot_account(
        &self,
        organization: &str,
        shortname: &str,
        _description: Option<&str>,
    ) -> GatewayResult {
        let name = format!("{}+{}", organization, shortname);
        self.record("create_robot_account", name.clone())?;
        if !self.robots.lock().unwrap().insert(name.clone()) {
            return Err(GatewayError::AlreadyExists(format!(
                "Existing robot with name: {}",
                name
            )));
        }
        Ok(json!({ "name": name, "token": "secret" }))
    }

    async fn delete_robot_account(&self, organization: &str, shortname: &str) -> GatewayResult {
        let name = format!("{}+{}", organization, shortname);
        self.record("delete_robot_account", name.clone())?;
        if !self.robots.lock().unwrap().remove(&name) {
            return Err(GatewayError::NotFound("Could not find robot".to_string()));
        }
        Ok(json!({}))
    }

    async fn get_robot_account(&self, organization: &str, shortname: &str) -> GatewayResult {
        let name = format!("{}+{}", organization, shortname);
        self.record("get_robot_account", name.clone())?;
        if self.robots.lock().unwrap().contains(&name) {
            Ok(json!({ "name": name }))
        } else {
            Err(GatewayError::NotFound("Could not find robot".to_string()))
        }
    }

    async fn list_robot_accounts(&self, organization: &str) -> GatewayResult {
        self.record("list_robot_accounts", organization.to_string())?;
        let prefix = format!("{}+", organization);
        let robots: Vec<Value> = self
            .robots
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.starts_with(&prefix))
            .map(|r| json!({ "name": r }))
            .collect();
        Ok(json!({ "robots": robots }))
    }

    async fn create_team(
        &self,
        organization: &str,
        team: &str,
        role: TeamRole,
        _description: Option<&str>,
    ) -> GatewayResult {
        let key = format!("{}/{}", organization, team);
        self.record("create_team", key.clone())?;
        let mut teams = self.teams.lock().unwrap();
        if teams.contains_key(&key) {
            return Err(GatewayError::AlreadyExists(format!("Team {} already exists", team)));
        }
        teams.insert(key, BTreeSet::new());
        Ok(json!({ "name": team, "role": role }))
    }

    async fn delete_team(&self, organization: &str, team: &str) -> GatewayResult {
        let key = format!("{}/{}", organization, team);
        self.record("delete_team", key.clone())?;
        if self.teams.lock().unwrap().remove(&key).is_none() {
            return Err(GatewayError::NotFound("Not Found".to_string()));
        }
        Ok(json!({}))
    }

    async fn get_team(&self, organization: &str, team: &str) -> GatewayResult {
        let key = format!("{}/{}", organization, team);
        self.record("get_team", key.clone())?;
        match self.teams.lock().unwrap().get(&key) {
            Some(members) => Ok(json!({ "name": team, "members": members })),
            None => Err(GatewayError::NotFound("Not Found".to_string())),
        }
    }

    async fn add_team_member(&self, organization: &str, team: &str, member: &str) -> GatewayResult {
        let key = format!("{}/{}", organization, team);
        self.record("add_team_member", format!("{} {}", key, member))?;
        let mut teams = self.teams.lock().unwrap();
        let members = teams
            .get_mut(&key)
            .ok_or_else(|| GatewayError::NotFound("Not Found".to_string()))?;
        if !members.insert(member.to_string()) {
            return Err(GatewayError::AlreadyExists("User is already a member".to_string()));
        }
        Ok(json!({ "name": member }))
    }

    async fn remove_team_member(
        &self,
        organization: &str,
        team: &str,
        member: &str,
    ) -> GatewayResult {
        let key = format!("{}/{}", organization, team);
        self.record("remove_team_member", format!("{} {}", key, member))?;
        let mut teams = self.teams.lock().unwrap();
        let removed = teams
            .get_mut(&key)
            .map(|members| members.remove(member))
            .unwrap_or(false);
        if !removed {
            return Err(GatewayError::NotFound("User is not a member of the team".to_string()));
        }
        Ok(json!({}))
    }

    async fn invite_team_member(&self, organization: &str, team: &str, email: &str) -> GatewayResult {
        self.record("invite_team_member", format!("{}/{} {}", organization, team, email))?;
        Ok(json!({ "email": email }))
    }

    async fn delete_team_invite(&self, organization: &str, team: &str, email: &str) -> GatewayResult {
        self.record("delete_team_invite", format!("{}/{} {}", organization, team, email))?;
        Ok(json!({}))
    }

    async fn sync_team_ldap(&self, organization: &str, team: &str, group_dn: &str) -> GatewayResult {
        let key = format!("{}/{}", organization, team);
        self.record("sync_team_ldap", key.clone())?;
        self.syncs.lock().unwrap().insert(key, group_dn.to_string());
        Ok(json!({ "group_dn": group_dn }))
    }

    async fn unsync_team_ldap(&self, organization: &str, team: &str) -> GatewayResult {
        let key = format!("{}/{}", organization, team);
        self.record("unsync_team_ldap", key.clone())?;
        if self.syncs.lock().unwrap().remove(&key).is_none() {
            return Err(GatewayError::NotFound("Team is not synced".to_string()));
        }
        Ok(json!({}))
    }

    async fn get_team_sync_status(&self, organization: &str, team: &str) -> GatewayResult {
        let key = format!("{}/{}", organization, team);
        self.record("get_team_sync_status", key.clone())?;
        match self.syncs.lock().unwrap().get(&key) {
            Some(dn) => Ok(json!({ "group_dn": dn })),
            None => Err(GatewayError::NotFound("Team is not synced".to_string())),
        }
    }

    async fn set_team_repository_permission(
        &self,
        organization: &str,
        team: &str,
        repository: &str,
        permission: Permission,
    ) -> GatewayResult {
        self.record(
            "set_team_repository_permission",
            format!("{}/{} {}", organization, team, repository),
        )?;
        Ok(json!({ "role": permission }))
    }

    async fn remove_team_repository_permission(
        &self,
        organization: &str,
        team: &str,
        repository: &str,
    ) -> GatewayResult {
        self.record(
            "remove_team_repository_permission",
            format!("{}/{} {}", organization, team, repository),
        )?;
        Ok(json!({}))
    }

    async fn list_prototypes(&self, organization: &str) -> GatewayResult {
        self.record("list_prototypes", organization.to_string())?;
        Ok(json!({ "prototypes": [] }))
    }

    async fn create_prototype(
        &self,
        organization: &str,
        delegate: &Delegate,
        role: Permission,
        _activating_user: Option<&str>,
    ) -> GatewayResult {
        self.record("create_prototype", format!("{} {}", organization, delegate.name))?;
        Ok(json!({ "id": "p1", "delegate": delegate, "role": role }))
    }

    async fn delete_prototype(&self, organization: &str, prototype_id: &str) -> GatewayResult {
        self.record("delete_prototype", format!("{} {}", organization, prototype_id))?;
        Ok(json!({}))
    }
}

/// Action that records its params; fails when `fail: true` is passed
pub struct CountingAction {
    seen: Arc<Mutex<Vec<Params>>>,
}

#[async_trait]
impl Action for CountingAction {
    fn name(&self) -> &'static str {
        "count"
    }

    async fn perform(&self, params: &Params) -> Result<Outcome, ActionError> {
        self.seen.lock().unwrap().push(params.clone());
        if params.get("fail") == Some(&json!(true)) {
            return Err(ActionError::Validation("asked to fail".to_string()));
        }
        Ok(Outcome::Done(json!({ "seen": params })))
    }
}

/// Built-in jobs plus a `count` job backed by [`CountingAction`]
pub fn counting_registry() -> (ActionRegistry, Arc<Mutex<Vec<Params>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ActionRegistry::builtin();
    let shared = seen.clone();
    registry.register("count", move |_| {
        Box::new(CountingAction {
            seen: shared.clone(),
        })
    });
    (registry, seen)
}

/// Prepare a pipeline from YAML strings
pub fn load(yaml: &str, inputs_yaml: &str, registry: &ActionRegistry) -> Result<LoadedPipeline, PipelineError> {
    let config = PipelineConfig::from_yaml(yaml)?;
    let inputs = if inputs_yaml.trim().is_empty() {
        Inputs::new()
    } else {
        Inputs::from_yaml(inputs_yaml)?
    };
    LoadedPipeline::prepare(&config, "scenario", inputs, registry)
}

/// Run a pipeline against `gateway` with the given registry
pub async fn run_with(
    yaml: &str,
    inputs_yaml: &str,
    gateway: Arc<MockGateway>,
    registry: ActionRegistry,
) -> RunStats {
    let loaded = load(yaml, inputs_yaml, &registry)
        .unwrap_or_else(|e| panic!("Failed to load scenario pipeline: {}", e));
    let engine = PipelineEngine::new(gateway, Arc::new(registry));
    engine.run(&loaded).await
}

/// Run a pipeline with the built-in jobs
pub async fn run(yaml: &str, inputs_yaml: &str, gateway: Arc<MockGateway>) -> RunStats {
    run_with(yaml, inputs_yaml, gateway, ActionRegistry::builtin()).await
}

fn summary(stats: &RunStats) -> String {
    format!(
        "{:?} - {} succeeded, {} failed, {} skipped, error: {:?}",
        stats.status, stats.successful, stats.failed, stats.skipped, stats.error
    )
}

/// Assert the run completed with every step succeeding
pub fn assert_run_completed(stats: &RunStats) {
    assert!(
        stats.status == ExecutionStatus::Completed && !stats.is_failed(),
        "Run should be completed, but was: {}",
        summary(stats)
    );
}

/// Assert the run failed
pub fn assert_run_failed(stats: &RunStats) {
    assert!(
        stats.is_failed(),
        "Run should have failed, but was: {}",
        summary(stats)
    );
}

/// Assert a step result exists and its message contains `expected`
pub fn assert_step_message(stats: &RunStats, step: &str, expected: &str) {
    let result = stats
        .results
        .iter()
        .find(|r| r.name == step)
        .unwrap_or_else(|| panic!("Step '{}' not found in results", step));
    let message = result.message.clone().unwrap_or_default();
    assert!(
        message.contains(expected),
        "Step '{}' message:\n{}\n\ndoes not contain:\n{}",
        step,
        message,
        expected
    );
}

/// Names of steps that produced a result, in order
pub fn executed_steps(stats: &RunStats) -> Vec<String> {
    stats.results.iter().map(|r| r.name.clone()).collect()
}
