//! Conversation controller.
//!
//! Owns the message thread, the worker status snapshot and the pending
//! request phase. The UI only calls the mutators below; the network call
//! itself happens outside so the optimistic user message can be drawn
//! before the worker answers.

use serde::{Deserialize, Serialize};

use crate::transport::{AIMessage, HealthStatus, ServiceStatus, StatusSnapshot, Transport, TransportError};

pub const GREETING: &str = "Hi, I'm your AI assistant. Ask anything to start the conversation.";
pub const GENERATE_FAILED: &str = "Calling the AI worker failed, please try again later.";
pub const STATUS_UNKNOWN: &str = "Service status unknown, please try again later.";
pub const HEALTH_CHECK_FAILED: &str = "Health check failed, please try again later.";

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub model: Option<String>,
    pub finish_reason: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), model: None, finish_reason: None }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), model: None, finish_reason: None }
    }
}

impl From<AIMessage> for Message {
    fn from(reply: AIMessage) -> Self {
        Self {
            role: Role::Assistant,
            content: reply.content,
            model: Some(reply.model).filter(|m| !m.is_empty()),
            finish_reason: reply.finish_reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingResponse,
}

/// What `submit` did with the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A user message was appended; send this prompt to the worker.
    Sent(String),
    /// Input was empty after trimming. Nothing changed.
    Empty,
    /// A request is already in flight. Nothing changed.
    Busy,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    phase: Phase,
    error: Option<String>,
    status: Option<ServiceStatus>,
    health: Option<HealthStatus>,
    health_error: Option<String>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            phase: Phase::Idle,
            error: None,
            status: None,
            health: None,
            health_error: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> Option<&ServiceStatus> {
        self.status.as_ref()
    }

    pub fn health(&self) -> Option<&HealthStatus> {
        self.health.as_ref()
    }

    pub fn health_error(&self) -> Option<&str> {
        self.health_error.as_deref()
    }

    /// Apply user input.
    ///
    /// On `Sent` the trimmed text has already been appended as a user
    /// message and the phase is `AwaitingResponse`.
    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        if self.phase == Phase::AwaitingResponse {
            tracing::debug!("submit ignored: request already in flight");
            return SubmitOutcome::Busy;
        }

        let prompt = input.trim();
        if prompt.is_empty() {
            return SubmitOutcome::Empty;
        }

        self.messages.push(Message::user(prompt));
        self.error = None;
        self.phase = Phase::AwaitingResponse;
        tracing::info!(prompt_len = prompt.len(), messages = self.messages.len(), "conversation: prompt submitted");

        SubmitOutcome::Sent(prompt.to_string())
    }

    pub fn on_response(&mut self, reply: AIMessage) {
        if self.phase != Phase::AwaitingResponse {
            tracing::warn!("conversation: response arrived with no request pending; dropped");
            return;
        }

        tracing::info!(
            model = %reply.model,
            finish_reason = reply.finish_reason.as_deref().unwrap_or("-"),
            content_len = reply.content.len(),
            "conversation: response received"
        );
        self.messages.push(Message::from(reply));
        self.phase = Phase::Idle;
    }

    pub fn on_failure(&mut self, err: &TransportError) {
        if self.phase != Phase::AwaitingResponse {
            tracing::warn!(error = %err, "conversation: failure arrived with no request pending; dropped");
            return;
        }

        tracing::error!(error = %err, code = err.code(), "conversation: generate failed");
        self.error = Some(GENERATE_FAILED.to_string());
        self.phase = Phase::Idle;
    }

    pub fn on_status_loaded(&mut self, snapshot: StatusSnapshot) {
        tracing::info!(
            message = %snapshot.status.message,
            model = snapshot.status.model.as_deref().unwrap_or("-"),
            "conversation: worker status loaded"
        );
        self.status = Some(snapshot.status);
        self.health = Some(snapshot.health);
        self.health_error = None;
    }

    pub fn on_status_failed(&mut self, err: &TransportError) {
        tracing::error!(error = %err, code = err.code(), "conversation: status fetch failed");
        self.status = Some(ServiceStatus { message: STATUS_UNKNOWN.to_string(), model: None });
        self.health_error = Some(HEALTH_CHECK_FAILED.to_string());
    }

    /// Submit and wait for the worker in one step.
    ///
    /// Returns what `submit` returned; the reply (or failure) has been
    /// folded in by the time this resolves.
    pub async fn exchange(&mut self, transport: &dyn Transport, input: &str) -> SubmitOutcome {
        let outcome = self.submit(input);
        if let SubmitOutcome::Sent(prompt) = &outcome {
            match transport.generate(prompt).await {
                Ok(reply) => self.on_response(reply),
                Err(err) => self.on_failure(&err),
            }
        }
        outcome
    }

    /// Fetch worker status once and fold the result in.
    pub async fn load_status(&mut self, transport: &dyn Transport) {
        match transport.fetch_status().await {
            Ok(snapshot) => self.on_status_loaded(snapshot),
            Err(err) => self.on_status_failed(&err),
        }
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
