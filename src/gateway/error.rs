//! Gateway error types

use reqwest::Method;
use thiserror::Error;

/// Outcome of a registry call that did not succeed
///
/// Classification from status code and body happens once, here, so actions
/// only ever match on variants.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource is already in the requested state
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Robot creation answered with the pre-check message; the robot is
    /// created regardless
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// Any other non-success response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection or protocol failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client could not be built
    #[error("Configuration error: {0}")]
    Config(String),
}

const ALREADY_EXISTS_PHRASES: &[&str] = &[
    "already exists",
    "existing robot with name",
    "already a member",
    "already synced",
    "already enabled",
    "already invited",
];

const ABSENT_PHRASES: &[&str] = &[
    "not a member",
    "not synced",
    "could not find",
    "does not exist",
];

const ROBOT_PRECHECK_PHRASE: &str = "could not find robot";

impl GatewayError {
    /// Classify a non-success response
    pub fn from_response(method: &Method, status: u16, body: &str) -> Self {
        let message = error_message(status, body);
        let lowered = body.to_ascii_lowercase();

        match status {
            404 => return GatewayError::NotFound(message),
            409 => return GatewayError::AlreadyExists(message),
            _ => {}
        }
        if !(400..500).contains(&status) {
            return GatewayError::Api { status, message };
        }

        if ALREADY_EXISTS_PHRASES.iter().any(|p| lowered.contains(p)) {
            return GatewayError::AlreadyExists(message);
        }
        if *method == Method::PUT && lowered.contains(ROBOT_PRECHECK_PHRASE) {
            return GatewayError::PreconditionFailed(message);
        }
        if (*method == Method::DELETE || *method == Method::GET)
            && ABSENT_PHRASES.iter().any(|p| lowered.contains(p))
        {
            return GatewayError::NotFound(message);
        }

        GatewayError::Api { status, message }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, GatewayError::AlreadyExists(_))
    }

    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, GatewayError::PreconditionFailed(_))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, GatewayError::Api { status, .. } if *status >= 500)
    }
}

/// Human-readable message from a Quay error body
///
/// Quay answers with `{"detail": ..., "error_message": ..., "message": ...}`;
/// anything else is returned verbatim.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_message", "detail", "message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}
