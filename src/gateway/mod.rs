//! Registry gateway: the capability set actions call into

pub mod client;
pub mod error;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use client::GatewayConfig;
pub use error::GatewayError;
pub use http::QuayHttpGateway;

pub type GatewayResult = Result<Value, GatewayError>;

/// Team role within an organization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    #[default]
    Member,
    Creator,
    Admin,
}

/// Repository permission granted to a team or prototype delegate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Read,
    Write,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelegateKind {
    Team,
    User,
}

/// Who a default permission prototype applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegate {
    pub name: String,
    pub kind: DelegateKind,
}

macro_rules! display_lowercase {
    ($ty:ty { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $(Self::$variant => $text),+
                };
                f.write_str(text)
            }
        }
    };
}

display_lowercase!(TeamRole { Member => "member", Creator => "creator", Admin => "admin" });
display_lowercase!(Permission { Read => "read", Write => "write", Admin => "admin" });
display_lowercase!(DelegateKind { Team => "team", User => "user" });

/// Operations against the registry API
///
/// Every call returns the response payload or a classified [`GatewayError`].
/// Implementations must be shareable across actions.
#[async_trait]
pub trait RegistryGateway: Send + Sync {
    // Organizations

    async fn create_organization(&self, name: &str, email: Option<&str>) -> GatewayResult;

    async fn delete_organization(&self, name: &str) -> GatewayResult;

    async fn get_organization(&self, name: &str) -> GatewayResult;

    async fn list_organizations(&self) -> GatewayResult;

    /// Existence check; only `NotFound` maps to `false`
    async fn organization_exists(&self, name: &str) -> Result<bool, GatewayError> {
        match self.get_organization(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    // Robot accounts

    async fn create_robot_account(
        &self,
        organization: &str,
        shortname: &str,
        description: Option<&str>,
    ) -> GatewayResult;

    async fn delete_robot_account(&self, organization: &str, shortname: &str) -> GatewayResult;

    async fn get_robot_account(&self, organization: &str, shortname: &str) -> GatewayResult;

    async fn list_robot_accounts(&self, organization: &str) -> GatewayResult;

    // Teams

    async fn create_team(
        &self,
        organization: &str,
        team: &str,
        role: TeamRole,
        description: Option<&str>,
    ) -> GatewayResult;

    async fn delete_team(&self, organization: &str, team: &str) -> GatewayResult;

    /// Team members; `NotFound` when the team does not exist
    async fn get_team(&self, organization: &str, team: &str) -> GatewayResult;

    async fn team_exists(&self, organization: &str, team: &str) -> Result<bool, GatewayError> {
        match self.get_team(organization, team).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn add_team_member(&self, organization: &str, team: &str, member: &str) -> GatewayResult;

    async fn remove_team_member(&self, organization: &str, team: &str, member: &str)
        -> GatewayResult;

    async fn invite_team_member(&self, organization: &str, team: &str, email: &str) -> GatewayResult;

    async fn delete_team_invite(&self, organization: &str, team: &str, email: &str) -> GatewayResult;

    // LDAP sync

    async fn sync_team_ldap(&self, organization: &str, team: &str, group_dn: &str) -> GatewayResult;

    async fn unsync_team_ldap(&self, organization: &str, team: &str) -> GatewayResult;

    async fn get_team_sync_status(&self, organization: &str, team: &str) -> GatewayResult;

    // Permissions

    async fn set_team_repository_permission(
        &self,
        organization: &str,
        team: &str,
        repository: &str,
        permission: Permission,
    ) -> GatewayResult;

    async fn remove_team_repository_permission(
        &self,
        organization: &str,
        team: &str,
        repository: &str,
    ) -> GatewayResult;

    async fn list_prototypes(&self, organization: &str) -> GatewayResult;

    async fn create_prototype(
        &self,
        organization: &str,
        delegate: &Delegate,
        role: Permission,
        activating_user: Option<&str>,
    ) -> GatewayResult;

    async fn delete_prototype(&self, organization: &str, prototype_id: &str) -> GatewayResult;
}
