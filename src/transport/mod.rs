//! Transport — the network contract with the worker.
//!
//! Two bindings implement [`Transport`]: plain REST (`GET /health`,
//! `POST /openai`) and GraphQL (one POST endpoint). The binding is picked
//! once at startup by [`connect`]; callers only see the trait.

pub mod graphql;
pub mod queries;
pub mod rest;
pub mod types;

#[cfg(test)]
pub mod test_helpers;

use std::sync::Arc;

pub use graphql::GraphQLClient;
pub use rest::RestClient;
pub use types::{AIMessage, HealthStatus, ServiceStatus, StatusSnapshot, TransportError};

use crate::config::{Config, TransportKind};

/// Capability interface the conversation controller talks to.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Short label for the active binding.
    fn name(&self) -> &'static str;

    /// Fetch the worker's status and a health record.
    async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError>;

    /// Ask the worker to answer `message`.
    async fn generate(&self, message: &str) -> Result<AIMessage, TransportError>;
}

/// Build the binding selected in `config`.
///
/// # Errors
///
/// Returns [`TransportError::HttpClientBuild`] if the HTTP client can't be constructed.
pub fn connect(config: &Config) -> Result<Arc<dyn Transport>, TransportError> {
    let transport: Arc<dyn Transport> = match config.transport {
        TransportKind::Rest => Arc::new(RestClient::new(&config.base_url)?),
        TransportKind::GraphQL => Arc::new(GraphQLClient::new(&config.base_url)?),
    };
    tracing::info!(binding = transport.name(), base_url = %config.base_url, "transport ready");
    Ok(transport)
}

pub(crate) fn http_client() -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .user_agent(concat!("worker-console/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TransportError::HttpClientBuild(e.to_string()))
}
