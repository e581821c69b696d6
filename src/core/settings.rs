//! Registry API settings
//!
//! Values come from an optional YAML settings file and are then overridden
//! by command-line flags (which fall back to environment variables).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("QUAY_API_BASE_URL is not set in environment variables or settings file")]
    MissingBaseUrl,

    #[error("QUAY_API_TOKEN is not set in environment variables or settings file")]
    MissingToken,

    #[error("Invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API timeout must be at least 1 second")]
    ZeroTimeout,

    #[error("Unknown auth type '{0}', expected one of: bearer, basic, apikey")]
    InvalidAuthType(String),
}

/// How the API token is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `Authorization: Basic <token>`
    Basic,
    /// `X-API-Key: <token>`
    #[serde(rename = "apikey")]
    ApiKey,
}

impl FromStr for AuthType {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(AuthType::Bearer),
            "basic" => Ok(AuthType::Basic),
            "apikey" | "api_key" | "api-key" => Ok(AuthType::ApiKey),
            other => Err(SettingsError::InvalidAuthType(other.to_string())),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::Bearer => write!(f, "bearer"),
            AuthType::Basic => write!(f, "basic"),
            AuthType::ApiKey => write!(f, "apikey"),
        }
    }
}

/// Settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
}

/// `api:` section of the settings document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub auth_type: AuthType,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// PEM bundle added to the trusted roots
    #[serde(default)]
    pub ca_bundle: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_tls_verify() -> bool {
    true
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            auth_type: AuthType::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tls_verify: true,
            ca_bundle: None,
        }
    }
}

/// Values supplied on the command line or through the environment
///
/// `None` leaves the settings-file value in place.
#[derive(Debug, Clone, Default)]
pub struct ApiOverrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub auth_type: Option<String>,
    pub timeout_secs: Option<u64>,
    pub disable_tls_verify: bool,
    pub ca_bundle: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| SettingsError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides; blank strings are ignored
    pub fn apply(&mut self, overrides: ApiOverrides) -> Result<(), SettingsError> {
        let api = &mut self.api;
        if let Some(base_url) = non_blank(overrides.base_url) {
            api.base_url = Some(base_url);
        }
        if let Some(token) = non_blank(overrides.token) {
            api.token = Some(token);
        }
        if let Some(auth_type) = non_blank(overrides.auth_type) {
            api.auth_type = auth_type.parse()?;
        }
        if let Some(timeout) = overrides.timeout_secs {
            api.timeout_secs = timeout;
        }
        if overrides.disable_tls_verify {
            api.tls_verify = false;
        }
        if let Some(ca_bundle) = overrides.ca_bundle {
            api.ca_bundle = Some(ca_bundle);
        }
        Ok(())
    }
}

impl ApiSettings {
    /// Check that the API can be reached with these settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        let base_url = self
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingBaseUrl)?;
        url::Url::parse(base_url).map_err(|source| SettingsError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if self.token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(SettingsError::MissingToken);
        }
        if self.timeout_secs == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
