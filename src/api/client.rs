//! HTTP implementation of [`TrussApi`] on top of reqwest.
//!
//! One attempt per call. Non-2xx answers are turned into `ApiError::Api`
//! carrying the server's `error` text when it sent one.

use async_trait::async_trait;
use log::{debug, info, warn};

use super::backend::{ApiError, SendRequest, TrussApi};
use super::types::{ChatReply, ConversationEntry, ErrorBody, HealthStatus, ReplyBody, SendBody};
use crate::ApiVariant;

pub struct HttpTrussApi {
    base_url: String,
    variant: ApiVariant,
    client: reqwest::Client,
}

impl HttpTrussApi {
    pub fn new(base_url: impl Into<String>, variant: ApiVariant) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            variant,
            client: reqwest::Client::new(),
        }
    }

    fn send_url(&self) -> String {
        match self.variant {
            ApiVariant::Parse => format!("{}/api/parse", self.base_url),
            ApiVariant::Chat => format!("{}/api/chat", self.base_url),
        }
    }

    fn history_url(&self, session_id: &str) -> String {
        match self.variant {
            ApiVariant::Parse => format!("{}/api/history/", self.base_url),
            ApiVariant::Chat => format!("{}/api/history/{}", self.base_url, session_id),
        }
    }

    fn health_url(&self) -> String {
        format!("{}/api/health", self.base_url)
    }
}

/// Turn a non-success response into `ApiError::Api`, preferring the body's `error` field.
async fn api_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.json::<ErrorBody>().await.unwrap_or_default();
    if let Some(ref detail) = body.detail {
        debug!("Backend error detail (HTTP {}): {}", status, detail);
    }
    let message = body
        .error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| format!("API error: {status}"));
    warn!("Backend returned HTTP {}: {}", status, message);
    ApiError::Api { status, message }
}

#[async_trait]
impl TrussApi for HttpTrussApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send_message(&self, request: SendRequest<'_>) -> Result<ChatReply, ApiError> {
        let body = SendBody {
            user_id: match self.variant {
                ApiVariant::Chat => Some(request.session_id),
                ApiVariant::Parse => None,
            },
            message: request.message,
        };
        let url = self.send_url();

        info!(
            "Sending message: url={}, variant={:?}, len={}",
            url,
            self.variant,
            request.message.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!("Send response status: {}", response.status());

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let reply: ReplyBody = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        let reply = ChatReply::from(reply);

        info!(
            "Reply received: {} chars, geometry={}",
            reply.response.len(),
            reply.truss_data.is_some()
        );
        Ok(reply)
    }

    async fn get_history(&self, session_id: &str) -> Result<Vec<ConversationEntry>, ApiError> {
        let url = self.history_url(session_id);
        debug!("Fetching history from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(ApiError::Api {
                status,
                message: format!("API error: {status}"),
            });
        }

        let entries: Vec<ConversationEntry> = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        info!("History loaded: {} entries", entries.len());
        Ok(entries)
    }

    async fn check_health(&self) -> HealthStatus {
        let url = self.health_url();
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Health check failed: {}", e);
                return HealthStatus::degraded(e.to_string());
            }
        };

        // The backend answers 503 with a normal body when the model service is down,
        // so the status code is not checked here.
        let status_code = response.status();
        match response.json::<HealthStatus>().await {
            Ok(status) => {
                info!(
                    "Health check: HTTP {}, ok={}, ollama={}",
                    status_code, status.ok, status.ollama
                );
                status
            }
            Err(e) => {
                warn!("Health check returned unreadable body (HTTP {}): {}", status_code, e);
                HealthStatus::unreadable(e.to_string())
            }
        }
    }
}
