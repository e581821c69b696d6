//! Gateway client configuration

use crate::core::settings::{ApiSettings, AuthType, SettingsError, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;

/// Configuration for the HTTP gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API root, e.g. `https://quay.example.com/api/v1`
    pub base_url: String,

    pub token: String,

    pub auth_type: AuthType,

    /// Timeout for each request in seconds
    pub timeout_secs: u64,

    pub tls_verify: bool,

    /// Extra PEM roots to trust
    pub ca_bundle: Option<PathBuf>,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            auth_type: AuthType::Bearer,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tls_verify: true,
            ca_bundle: None,
        }
    }

    /// Build from validated settings
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let base_url = settings.base_url.clone().ok_or(SettingsError::MissingBaseUrl)?;
        let token = settings.token.clone().ok_or(SettingsError::MissingToken)?;
        Ok(Self {
            base_url,
            token,
            auth_type: settings.auth_type,
            timeout_secs: settings.timeout_secs,
            tls_verify: settings.tls_verify,
            ca_bundle: settings.ca_bundle.clone(),
        })
    }

    pub fn with_auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = auth_type;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_tls_verify(mut self, tls_verify: bool) -> Self {
        self.tls_verify = tls_verify;
        self
    }

    pub fn with_ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(path.into());
        self
    }
}
