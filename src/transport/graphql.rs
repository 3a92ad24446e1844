//! GraphQL binding: every operation is a POST of `{query, variables,
//! operationName}` to one endpoint.
//!
//! The worker reports resolver failures as an `errors` array on an HTTP 200,
//! so the envelope is checked in [`parse_graphql_response`] before `data`
//! is decoded into the caller's type.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::queries::{GENERATE_MUTATION, HEALTH_QUERY, STATUS_QUERY};
use super::rest::{join_url, read_body};
use super::types::{AIMessage, HealthStatus, ServiceStatus, StatusSnapshot, TransportError};
use super::Transport;

const GRAPHQL_PATH: &str = "graphql";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_name: Option<&'a str>,
}

#[derive(Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLErrorEntry>>,
}

#[derive(Deserialize)]
struct GraphQLErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    status: ServiceStatus,
}

#[derive(Debug, Deserialize)]
struct HealthData {
    health: HealthStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateData {
    generate_response: AIMessage,
}

#[derive(Clone)]
pub struct GraphQLClient {
    client: Client,
    endpoint: String,
}

impl GraphQLClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Ok(Self::with_client(super::http_client()?, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: join_url(base_url, GRAPHQL_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one operation and decode its `data` payload.
    ///
    /// # Errors
    ///
    /// Non-2xx responses map to [`TransportError::Status`], a non-empty
    /// `errors` array to [`TransportError::GraphQL`], and a missing `data`
    /// field to [`TransportError::MissingData`].
    pub async fn execute<TData>(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: Option<&str>,
    ) -> Result<TData, TransportError>
    where
        TData: DeserializeOwned,
    {
        tracing::debug!(endpoint = %self.endpoint, operation = operation_name.unwrap_or("anonymous"), "graphql: execute");

        let body = GraphQLRequest { query, variables, operation_name };
        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let (status, text) = read_body(response).await?;

        parse_graphql_response(status, &text)
    }

    /// Run the `Health` query.
    pub async fn fetch_health(&self) -> Result<HealthStatus, TransportError> {
        let data: HealthData = self.execute(HEALTH_QUERY, None, Some("Health")).await?;
        Ok(data.health)
    }
}

#[async_trait::async_trait]
impl Transport for GraphQLClient {
    fn name(&self) -> &'static str {
        "GraphQL"
    }

    async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError> {
        let data: StatusData = self.execute(STATUS_QUERY, None, Some("Status")).await?;
        Ok(StatusSnapshot::stamped_now(data.status))
    }

    async fn generate(&self, message: &str) -> Result<AIMessage, TransportError> {
        let data: GenerateData = self
            .execute(GENERATE_MUTATION, Some(generate_variables(message)), Some("GenerateResponse"))
            .await?;
        Ok(data.generate_response)
    }
}

fn generate_variables(message: &str) -> Value {
    json!({ "input": { "message": message } })
}

/// Check the GraphQL envelope and decode `data` into `TData`.
pub fn parse_graphql_response<TData>(status: u16, text: &str) -> Result<TData, TransportError>
where
    TData: DeserializeOwned,
{
    if !(200..300).contains(&status) {
        return Err(TransportError::status(status, text.to_string()));
    }

    let envelope: GraphQLResponse = serde_json::from_str(text).map_err(|e| TransportError::Parse(e.to_string()))?;

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        let messages = errors.into_iter().map(|e| e.message).collect();
        return Err(TransportError::GraphQL { messages });
    }

    match envelope.data {
        None | Some(Value::Null) => Err(TransportError::MissingData),
        Some(data) => serde_json::from_value(data).map_err(|e| TransportError::Parse(e.to_string())),
    }
}

#[cfg(test)]
#[path = "graphql_test.rs"]
mod tests;
