use std::fmt;

use async_trait::async_trait;

use super::types::{ChatReply, ConversationEntry, HealthStatus};

/// Errors that can occur while talking to the truss backend.
/// No call is retried; the caller decides what to show.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Network-level failure (DNS, connection refused, reset).
    Transport(String),
    /// Backend answered with a non-success status. `message` is the server's
    /// `error` field, or `API error: {status}` when the body had none.
    Api { status: u16, message: String },
    /// Backend answered 2xx but the body was not a recognizable reply.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { message, .. } => write!(f, "{message}"),
            ApiError::Parse(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Everything the backend needs to answer one chat message.
pub struct SendRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
}

#[async_trait]
pub trait TrussApi: Send + Sync {
    /// Base URL the client was configured with (for status and diagnostics).
    fn base_url(&self) -> &str;

    /// Sends one user message and returns the assistant reply.
    async fn send_message(&self, request: SendRequest<'_>) -> Result<ChatReply, ApiError>;

    /// Fetches the stored conversation, newest first.
    async fn get_history(&self, session_id: &str) -> Result<Vec<ConversationEntry>, ApiError>;

    /// Probes backend readiness. Never fails: problems come back as a degraded status.
    async fn check_health(&self) -> HealthStatus;
}
