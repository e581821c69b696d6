//! Quay REST API gateway over reqwest

use crate::core::settings::AuthType;
use crate::gateway::{
    client::GatewayConfig, Delegate, GatewayError, GatewayResult, Permission, RegistryGateway,
    TeamRole,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

const MASKED: &str = "***REDACTED***";

/// Registry gateway talking to a Quay instance
#[derive(Debug, Clone)]
pub struct QuayHttpGateway {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
    /// Name of the credential header, for masked request logging
    auth_header: &'static str,
}

impl QuayHttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(config.base_url.trim())
            .map_err(|e| GatewayError::Config(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Config(format!(
                "base URL '{}' cannot hold a path",
                config.base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        let (auth_name, auth_value) = match config.auth_type {
            AuthType::Bearer => (AUTHORIZATION, format!("Bearer {}", config.token)),
            AuthType::Basic => (AUTHORIZATION, format!("Basic {}", config.token)),
            AuthType::ApiKey => (HeaderName::from_static("x-api-key"), config.token.clone()),
        };
        let mut auth_value = HeaderValue::from_str(&auth_value)
            .map_err(|_| GatewayError::Config("token contains invalid header characters".to_string()))?;
        auth_value.set_sensitive(true);
        let auth_header = match config.auth_type {
            AuthType::ApiKey => "X-API-Key",
            _ => "Authorization",
        };
        headers.insert(auth_name, auth_value);

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("quay-pipeline/{}", env!("CARGO_PKG_VERSION")));

        if !config.tls_verify {
            debug!("TLS verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        } else if let Some(path) = &config.ca_bundle {
            let pem = std::fs::read(path).map_err(|e| {
                GatewayError::Config(format!("failed to read CA bundle {}: {}", path.display(), e))
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                GatewayError::Config(format!("invalid CA bundle {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let http = builder
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))?;

        debug!(
            "Gateway ready: base_url={} auth_type={} timeout={}s",
            base_url, config.auth_type, config.timeout_secs
        );

        Ok(Self {
            http,
            base_url,
            timeout_secs: config.timeout_secs,
            auth_header,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join percent-encoded path segments onto the base URL
    ///
    /// A trailing empty segment yields a trailing slash.
    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Config(format!("base URL '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn curl_line(&self, method: &Method, url: &Url, body: Option<&Value>) -> String {
        let mut line = format!(
            "curl -X {} -H 'Content-Type: application/json' -H '{}: {}'",
            method, self.auth_header, MASKED
        );
        if let Some(body) = body {
            line.push_str(&format!(" -d '{}'", body));
        }
        line.push_str(&format!(" '{}'", url));
        line
    }

    fn transport_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout(self.timeout_secs)
        } else {
            GatewayError::Http(error)
        }
    }

    async fn request(&self, method: Method, segments: &[&str], body: Option<Value>) -> GatewayResult {
        let url = self.url(segments)?;
        debug!("[CURL]: {}", self.curl_line(&method, &url, body.as_ref()));

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            debug!("HTTP {} on {} {} body={}", status.as_u16(), method, url, text);
            return Err(GatewayError::from_response(&method, status.as_u16(), &text));
        }

        Ok(parse_body(status.as_u16(), &text))
    }

    async fn get(&self, segments: &[&str]) -> GatewayResult {
        self.request(Method::GET, segments, None).await
    }

    async fn post(&self, segments: &[&str], body: Value) -> GatewayResult {
        self.request(Method::POST, segments, Some(body)).await
    }

    async fn put(&self, segments: &[&str], body: Option<Value>) -> GatewayResult {
        self.request(Method::PUT, segments, body).await
    }

    async fn delete(&self, segments: &[&str]) -> GatewayResult {
        self.request(Method::DELETE, segments, None).await
    }
}

/// Successful response body as JSON
///
/// Empty bodies become `{}`; non-JSON bodies are wrapped with a warning.
fn parse_body(status: u16, text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({});
    }
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            debug!("Non-JSON response received");
            json!({
                "warning": "Non-JSON response",
                "status": status,
                "raw": text,
            })
        }
    }
}

#[async_trait]
impl RegistryGateway for QuayHttpGateway {
    async fn create_organization(&self, name: &str, email: Option<&str>) -> GatewayResult {
        debug!("create_organization name={} email={:?}", name, email);
        let mut payload = json!({ "name": name });
        if let Some(email) = email {
            payload["email"] = json!(email);
        }
        self.post(&["organization", ""], payload).await
    }

    async fn delete_organization(&self, name: &str) -> GatewayResult {
        debug!("delete_organization name={}", name);
        self.delete(&["organization", name]).await
    }

    async fn get_organization(&self, name: &str) -> GatewayResult {
        debug!("get_organization name={}", name);
        self.get(&["organization", name]).await
    }

    async fn list_organizations(&self) -> GatewayResult {
        debug!("list_organizations");
        self.get(&["organization"]).await
    }

    async fn create_robot_account(
        &self,
        organization: &str,
        shortname: &str,
        description: Option<&str>,
    ) -> GatewayResult {
        debug!("create_robot_account org={} robot={}", organization, shortname);
        let payload = json!({ "description": description });
        self.put(&["organization", organization, "robots", shortname], Some(payload))
            .await
    }

    async fn delete_robot_account(&self, organization: &str, shortname: &str) -> GatewayResult {
        debug!("delete_robot_account org={} robot={}", organization, shortname);
        self.delete(&["organization", organization, "robots", shortname])
            .await
    }

    async fn get_robot_account(&self, organization: &str, shortname: &str) -> GatewayResult {
        debug!("get_robot_account org={} robot={}", organization, shortname);
        self.get(&["organization", organization, "robots", shortname]).await
    }

    async fn list_robot_accounts(&self, organization: &str) -> GatewayResult {
        debug!("list_robot_accounts org={}", organization);
        self.get(&["organization", organization, "robots", ""]).await
    }

    async fn create_team(
        &self,
        organization: &str,
        team: &str,
        role: TeamRole,
        description: Option<&str>,
    ) -> GatewayResult {
        debug!("create_team org={} team={} role={}", organization, team, role);
        let mut payload = json!({ "role": role });
        if let Some(description) = description {
            payload["description"] = json!(description);
        }
        self.put(&["organization", organization, "team", team], Some(payload))
            .await
    }

    async fn delete_team(&self, organization: &str, team: &str) -> GatewayResult {
        debug!("delete_team org={} team={}", organization, team);
        self.delete(&["organization", organization, "team", team]).await
    }

    async fn get_team(&self, organization: &str, team: &str) -> GatewayResult {
        debug!("get_team org={} team={}", organization, team);
        self.get(&["organization", organization, "team", team, "members"])
            .await
    }

    async fn add_team_member(&self, organization: &str, team: &str, member: &str) -> GatewayResult {
        debug!("add_team_member org={} team={} member={}", organization, team, member);
        self.put(&["organization", organization, "team", team, "members", member], None)
            .await
    }

    async fn remove_team_member(
        &self,
        organization: &str,
        team: &str,
        member: &str,
    ) -> GatewayResult {
        debug!("remove_team_member org={} team={} member={}", organization, team, member);
        self.delete(&["organization", organization, "team", team, "members", member])
            .await
    }

    async fn invite_team_member(&self, organization: &str, team: &str, email: &str) -> GatewayResult {
        debug!("invite_team_member org={} team={} email={}", organization, team, email);
        self.put(&["organization", organization, "team", team, "invite", email], None)
            .await
    }

    async fn delete_team_invite(&self, organization: &str, team: &str, email: &str) -> GatewayResult {
        debug!("delete_team_invite org={} team={} email={}", organization, team, email);
        self.delete(&["organization", organization, "team", team, "invite", email])
            .await
    }

    async fn sync_team_ldap(&self, organization: &str, team: &str, group_dn: &str) -> GatewayResult {
        debug!("sync_team_ldap org={} team={} group_dn={}", organization, team, group_dn);
        self.post(
            &["organization", organization, "team", team, "syncing"],
            json!({ "group_dn": group_dn }),
        )
        .await
    }

    async fn unsync_team_ldap(&self, organization: &str, team: &str) -> GatewayResult {
        debug!("unsync_team_ldap org={} team={}", organization, team);
        self.delete(&["organization", organization, "team", team, "syncing"])
            .await
    }

    async fn get_team_sync_status(&self, organization: &str, team: &str) -> GatewayResult {
        debug!("get_team_sync_status org={} team={}", organization, team);
        self.get(&["organization", organization, "team", team, "syncing"])
            .await
    }

    async fn set_team_repository_permission(
        &self,
        organization: &str,
        team: &str,
        repository: &str,
        permission: Permission,
    ) -> GatewayResult {
        debug!(
            "set_team_repository_permission org={} team={} repo={} permission={}",
            organization, team, repository, permission
        );
        self.put(
            &["organization", organization, "team", team, "repositories", repository],
            Some(json!({ "permission": permission })),
        )
        .await
    }

    async fn remove_team_repository_permission(
        &self,
        organization: &str,
        team: &str,
        repository: &str,
    ) -> GatewayResult {
        debug!(
            "remove_team_repository_permission org={} team={} repo={}",
            organization, team, repository
        );
        self.delete(&["organization", organization, "team", team, "repositories", repository])
            .await
    }

    async fn list_prototypes(&self, organization: &str) -> GatewayResult {
        debug!("list_prototypes org={}", organization);
        self.get(&["organization", organization, "prototypes"]).await
    }

    async fn create_prototype(
        &self,
        organization: &str,
        delegate: &Delegate,
        role: Permission,
        activating_user: Option<&str>,
    ) -> GatewayResult {
        debug!(
            "create_prototype org={} delegate={}/{} role={} user={:?}",
            organization, delegate.kind, delegate.name, role, activating_user
        );
        let mut payload = json!({ "delegate": delegate, "role": role });
        if let Some(user) = activating_user {
            payload["activating_user"] = json!({ "name": user });
        }
        self.post(&["organization", organization, "prototypes"], payload)
            .await
    }

    async fn delete_prototype(&self, organization: &str, prototype_id: &str) -> GatewayResult {
        debug!("delete_prototype org={} prototype_id={}", organization, prototype_id);
        self.delete(&["organization", organization, "prototypes", prototype_id])
            .await
    }
}
