//! Worker-facing data types and the transport failure contract.
//!
//! These types are shared by the REST and GraphQL bindings and by the
//! conversation controller. They don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// Operational message and active model reported by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Health indicator with an RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

/// A generated reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Result of one status fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: ServiceStatus,
    pub health: HealthStatus,
}

impl StatusSnapshot {
    /// Pair a status with a health record stamped with the current time.
    ///
    /// Both bindings build health this way; the worker's own health
    /// payload is only read by [`super::graphql::GraphQLClient::fetch_health`].
    pub fn stamped_now(status: ServiceStatus) -> Self {
        let health = HealthStatus {
            status: status.message.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        Self { status, health }
    }
}

/// Errors produced by transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP exchange itself failed (connect, TLS, I/O).
    #[error("request failed: {0}")]
    Request(String),

    /// The worker returned a non-success HTTP status.
    #[error("request failed with status {status}{}", .body.as_deref().map(|b| format!(": {b}")).unwrap_or_default())]
    Status { status: u16, body: Option<String> },

    /// The response body was not the expected JSON.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The GraphQL response carried a non-empty `errors` array.
    #[error("graphql error: {}", .messages.join("; "))]
    GraphQL { messages: Vec<String> },

    /// HTTP success, no errors, but no `data` payload.
    #[error("graphql response does not contain data")]
    MissingData,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl TransportError {
    /// Build a status error, dropping an empty body.
    pub fn status(status: u16, body: String) -> Self {
        let body = if body.trim().is_empty() { None } else { Some(body) };
        Self::Status { status, body }
    }

    /// Short machine-readable code, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_REQUEST",
            Self::Status { .. } => "E_STATUS",
            Self::Parse(_) => "E_PARSE",
            Self::GraphQL { .. } => "E_GRAPHQL",
            Self::MissingData => "E_MISSING_DATA",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
