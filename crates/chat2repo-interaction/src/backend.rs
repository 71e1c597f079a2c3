//! Backend trait.
//!
//! Defines the remote operations the widget depends on, decoupling the
//! pipeline from the HTTP transport so it can be driven by a mock in tests.

use crate::api::{ChatResponse, HealthResponse, QuestionRequest, RepoChatRequest, TechChatRequest};
use async_trait::async_trait;
use chat2repo_core::Result;
use chat2repo_core::session::{SessionSummary, SessionTranscript};

/// The question-answering and session service.
///
/// Every method maps to exactly one HTTP call. Implementations never retry.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Asks a general technical question.
    async fn ask_tech(&self, request: &TechChatRequest) -> Result<ChatResponse>;

    /// Asks a question about one repository.
    async fn ask_repo(&self, request: &RepoChatRequest) -> Result<ChatResponse>;

    /// Lists stored sessions.
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>>;

    /// Fetches the transcript of one session.
    ///
    /// # Returns
    ///
    /// - `Ok(SessionTranscript)`: Session found
    /// - `Err(ChatError::Api { status: 404, .. })`: Session does not exist
    /// - `Err(_)`: Transport or decoding failure
    async fn get_session(&self, session_id: &str) -> Result<SessionTranscript>;

    /// Deletes a stored session.
    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// Reports backend liveness.
    async fn health(&self) -> Result<HealthResponse>;

    /// Sends a question to the endpoint matching its mode.
    async fn ask(&self, request: &QuestionRequest) -> Result<ChatResponse> {
        match request {
            QuestionRequest::Tech(req) => self.ask_tech(req).await,
            QuestionRequest::Repo(req) => self.ask_repo(req).await,
        }
    }
}
