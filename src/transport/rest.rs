//! REST binding: `GET /health` and `POST /openai`.
//!
//! Thin HTTP wrapper. Body handling lives in pure `parse_*` functions so
//! every status/body combination can be tested without a network.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::types::{AIMessage, ServiceStatus, StatusSnapshot, TransportError};
use super::Transport;

const HEALTH_PATH: &str = "/health";
const GENERATE_PATH: &str = "/openai";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize, Default)]
struct WorkerHealthResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Ok(Self::with_client(super::http_client()?, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait::async_trait]
impl Transport for RestClient {
    fn name(&self) -> &'static str {
        "REST"
    }

    async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError> {
        let url = self.url(HEALTH_PATH);
        tracing::debug!(%url, "rest: fetching status");

        let response = self.client.get(&url).send().await?;
        let (status, text) = read_body(response).await?;
        let service = parse_health_response(status, &text)?;

        Ok(StatusSnapshot::stamped_now(service))
    }

    async fn generate(&self, message: &str) -> Result<AIMessage, TransportError> {
        let url = self.url(GENERATE_PATH);
        tracing::debug!(%url, message_len = message.len(), "rest: generate");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { message })
            .send()
            .await?;
        let (status, text) = read_body(response).await?;

        parse_generate_response(status, &text)
    }
}

pub(crate) async fn read_body(response: reqwest::Response) -> Result<(u16, String), TransportError> {
    let status = response.status().as_u16();
    let text = response.text().await?;
    Ok((status, text))
}

/// Join `base` and `path` with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Decode a worker response body.
///
/// Non-2xx fails with the status and body, 204 yields `T::default()`,
/// anything else must be JSON.
pub fn parse_body<T>(status: u16, text: &str) -> Result<T, TransportError>
where
    T: DeserializeOwned + Default,
{
    if !(200..300).contains(&status) {
        return Err(TransportError::status(status, text.to_string()));
    }
    if status == 204 {
        return Ok(T::default());
    }
    serde_json::from_str(text).map_err(|e| TransportError::Parse(e.to_string()))
}

pub fn parse_health_response(status: u16, text: &str) -> Result<ServiceStatus, TransportError> {
    let body: WorkerHealthResponse = parse_body(status, text)?;
    Ok(ServiceStatus { message: body.message, model: body.model })
}

pub fn parse_generate_response(status: u16, text: &str) -> Result<AIMessage, TransportError> {
    parse_body(status, text)
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
