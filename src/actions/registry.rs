//! Action registry: job name to action factory

use crate::actions::{ldap, organization, permission, robot_account, team, Action};
use crate::gateway::RegistryGateway;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builds an action around a gateway
pub type ActionFactory = Arc<dyn Fn(Arc<dyn RegistryGateway>) -> Box<dyn Action> + Send + Sync>;

type Constructor = fn(Arc<dyn RegistryGateway>) -> Box<dyn Action>;

/// Built-in jobs
const BUILTIN_JOBS: &[(&str, Constructor)] = &[
    ("create_organization", |g| Box::new(organization::CreateOrganization::new(g))),
    ("delete_organization", |g| Box::new(organization::DeleteOrganization::new(g))),
    ("get_organization", |g| Box::new(organization::GetOrganization::new(g))),
    ("list_organizations", |g| Box::new(organization::ListOrganizations::new(g))),
    ("create_robot_account", |g| Box::new(robot_account::CreateRobotAccount::new(g))),
    ("delete_robot_account", |g| Box::new(robot_account::DeleteRobotAccount::new(g))),
    ("get_robot_account", |g| Box::new(robot_account::GetRobotAccount::new(g))),
    ("list_robot_accounts", |g| Box::new(robot_account::ListRobotAccounts::new(g))),
    ("create_team", |g| Box::new(team::CreateTeam::new(g))),
    ("delete_team", |g| Box::new(team::DeleteTeam::new(g))),
    ("get_team", |g| Box::new(team::GetTeam::new(g))),
    ("add_team_member", |g| Box::new(team::AddTeamMember::new(g))),
    ("remove_team_member", |g| Box::new(team::RemoveTeamMember::new(g))),
    ("invite_team_member", |g| Box::new(team::InviteTeamMember::new(g))),
    ("delete_team_invite", |g| Box::new(team::DeleteTeamInvite::new(g))),
    ("sync_team_ldap", |g| Box::new(ldap::SyncTeamLdap::new(g))),
    ("unsync_team_ldap", |g| Box::new(ldap::UnsyncTeamLdap::new(g))),
    ("get_team_sync_status", |g| Box::new(ldap::GetTeamSyncStatus::new(g))),
    ("set_team_repository_permission", |g| {
        Box::new(permission::SetTeamRepositoryPermission::new(g))
    }),
    ("remove_team_repository_permission", |g| {
        Box::new(permission::RemoveTeamRepositoryPermission::new(g))
    }),
    ("set_default_repository_permission", |g| {
        Box::new(permission::SetDefaultRepositoryPermission::new(g))
    }),
    ("remove_default_repository_permission", |g| {
        Box::new(permission::RemoveDefaultRepositoryPermission::new(g))
    }),
];

/// Mapping from job name to action factory
///
/// Built once at startup and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    factories: BTreeMap<String, ActionFactory>,
}

impl ActionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in job
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (job, constructor) in BUILTIN_JOBS {
            registry.register(*job, *constructor);
        }
        registry
    }

    /// Register a factory, replacing any existing one for the job
    pub fn register<F>(&mut self, job: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(Arc<dyn RegistryGateway>) -> Box<dyn Action> + Send + Sync + 'static,
    {
        self.factories.insert(job.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, job: &str) -> bool {
        self.factories.contains_key(job)
    }

    /// Instantiate the action for a job
    pub fn create(&self, job: &str, gateway: Arc<dyn RegistryGateway>) -> Option<Box<dyn Action>> {
        self.factories.get(job).map(|factory| factory(gateway))
    }

    /// Registered job names in sorted order
    pub fn job_names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Comma-separated job names, for error messages
    pub fn allowed_jobs(&self) -> String {
        self.job_names().join(", ")
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("jobs", &self.job_names())
            .finish()
    }
}
