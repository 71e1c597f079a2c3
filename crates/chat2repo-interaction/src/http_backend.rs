//! HttpChatBackend - REST client for the chat2repo API.
//!
//! Talks JSON over HTTP with reqwest. Each request carries the configured
//! timeout; non-success responses are mapped to `ChatError::Api` using the
//! `detail` field of the error body.

use crate::api::{
    ChatResponse, DeleteSessionResponse, HealthResponse, RepoChatRequest, SessionListResponse,
    TechChatRequest, error_detail,
};
use crate::backend::ChatBackend;
use crate::config::ClientConfig;
use async_trait::async_trait;
use chat2repo_core::session::{SessionSummary, SessionTranscript};
use chat2repo_core::{ChatError, Result};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend implementation that talks to the chat2repo HTTP API.
#[derive(Clone)]
pub struct HttpChatBackend {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpChatBackend {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ChatError::config(format!("Invalid base URL '{base_url}': {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ChatError::config(format!(
                "Base URL '{base_url}' cannot carry a path"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ChatError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        if !status.is_success() {
            tracing::debug!("[Backend] HTTP {} body: {}", status.as_u16(), body);
            return Err(ChatError::api(status.as_u16(), error_detail(&body)));
        }

        serde_json::from_str(&body)
            .map_err(|err| ChatError::decode(format!("Failed to parse response: {err}")))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ChatError {
        if err.is_timeout() {
            ChatError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            ChatError::transport(err.to_string())
        }
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn ask_tech(&self, request: &TechChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint(&["api", "chat", "tech"]);
        tracing::debug!("[Backend] POST {}", url);
        self.send(self.client.post(url).json(request)).await
    }

    async fn ask_repo(&self, request: &RepoChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint(&["api", "chat", "repo"]);
        tracing::debug!(
            "[Backend] POST {} ({}/{})",
            url,
            request.repo_owner,
            request.repo_name
        );
        self.send(self.client.post(url).json(request)).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let url = self.endpoint(&["api", "sessions"]);
        let response: SessionListResponse = self.send(self.client.get(url)).await?;
        Ok(response.sessions)
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionTranscript> {
        let url = self.endpoint(&["api", "sessions", session_id]);
        self.send(self.client.get(url)).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let url = self.endpoint(&["api", "sessions", session_id]);
        let response: DeleteSessionResponse = self.send(self.client.delete(url)).await?;
        tracing::info!(
            "[Backend] Deleted session {}: {}",
            session_id,
            response.message.unwrap_or_default()
        );
        Ok(())
    }

    async fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint(&["health"]);
        self.send(self.client.get(url)).await
    }
}
