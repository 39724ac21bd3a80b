//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::ApiVariant;
use crate::api::{ApiError, ChatReply, ConversationEntry, HealthStatus, SendRequest, TrussApi};
use crate::core::identity::MemoryIdentity;

/// Canned backend for tests that don't need real HTTP.
pub struct StubApi {
    reply: Mutex<Result<ChatReply, ApiError>>,
    history: Mutex<Result<Vec<ConversationEntry>, ApiError>>,
    health: Mutex<HealthStatus>,
    sends: AtomicUsize,
}

impl Default for StubApi {
    fn default() -> Self {
        Self {
            reply: Mutex::new(Ok(ChatReply {
                response: "ok".to_string(),
                truss_data: None,
            })),
            history: Mutex::new(Ok(Vec::new())),
            health: Mutex::new(HealthStatus {
                ok: true,
                ollama: true,
                error: None,
                backend_reachable: true,
            }),
            sends: AtomicUsize::new(0),
        }
    }
}

impl StubApi {
    pub fn replying(reply: Result<ChatReply, ApiError>) -> Self {
        let stub = Self::default();
        *stub.reply.lock().unwrap() = reply;
        stub
    }

    pub fn with_history(self, history: Result<Vec<ConversationEntry>, ApiError>) -> Self {
        *self.history.lock().unwrap() = history;
        self
    }

    pub fn with_health(self, health: HealthStatus) -> Self {
        *self.health.lock().unwrap() = health;
        self
    }

    /// Number of `send_message` calls made so far.
    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrussApi for StubApi {
    fn base_url(&self) -> &str {
        "http://stub"
    }

    async fn send_message(&self, _request: SendRequest<'_>) -> Result<ChatReply, ApiError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.reply.lock().unwrap().clone()
    }

    async fn get_history(&self, _session_id: &str) -> Result<Vec<ConversationEntry>, ApiError> {
        self.history.lock().unwrap().clone()
    }

    async fn check_health(&self) -> HealthStatus {
        self.health.lock().unwrap().clone()
    }
}

/// Creates a test App backed by a default StubApi and a fixed session id.
pub fn test_app() -> crate::core::state::App {
    test_app_with(Arc::new(StubApi::default()))
}

pub fn test_app_with(api: Arc<dyn TrussApi>) -> crate::core::state::App {
    crate::core::state::App::new(api, &MemoryIdentity::new("user_test00001"), ApiVariant::Parse)
}
