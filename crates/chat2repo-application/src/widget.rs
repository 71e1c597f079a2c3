//! ChatWidget - the conversation state machine.
//!
//! The widget owns every piece of client state: mode, composer, message list,
//! session sidebar, active session id and the pipeline state. Front ends
//! mutate it from a single owner; remote calls are either awaited directly
//! (`submit`, `refresh_sessions`, ...) or run as a detached [`DispatchJob`]
//! whose [`Completion`] is fed back through `complete_submission`.

use chat2repo_core::composer::Composer;
use chat2repo_core::conversation::Conversation;
use chat2repo_core::mode::{LanguageChoice, ModeSelector, RepoTarget};
use chat2repo_core::pipeline::{Generation, PipelineState};
use chat2repo_core::session::{SessionSummary, SessionTranscript};
use chat2repo_core::sidebar::SessionSidebar;
use chat2repo_core::{ChatError, ChatMode, MessageId, MessageRole, Result};
use chat2repo_interaction::config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use chat2repo_interaction::{
    ChatBackend, ChatResponse, QuestionRequest, RepoChatRequest, TechChatRequest,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Identifies the request a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: Generation,
    pub placeholder: MessageId,
}

/// A dispatched question, ready to run on any task.
///
/// Holds only the backend handle and the request, never the widget, so it can
/// be spawned while the front end keeps drawing.
pub struct DispatchJob {
    backend: Arc<dyn ChatBackend>,
    request: QuestionRequest,
    cancel: CancellationToken,
    timeout: Duration,
    ticket: Ticket,
}

impl DispatchJob {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn request(&self) -> &QuestionRequest {
        &self.request
    }

    /// Performs exactly one backend call, bounded by the timeout and the
    /// cancellation token.
    pub async fn run(self) -> Completion {
        let seconds = self.timeout.as_secs();
        let result = tokio::select! {
            _ = self.cancel.cancelled() => Err(ChatError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, self.backend.ask(&self.request)) => {
                outcome.unwrap_or(Err(ChatError::Timeout { seconds }))
            }
        };
        Completion {
            ticket: self.ticket,
            result,
        }
    }
}

/// Result of a [`DispatchJob`].
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: Result<ChatResponse>,
}

/// What `begin_submission` did.
pub enum SubmitOutcome {
    /// Nothing to send, or a request is already in flight.
    Ignored,
    /// Rejected locally; the error was appended to the conversation.
    Rejected(ChatError),
    /// The user message and placeholder are shown; run the job to finish.
    Dispatched(DispatchJob),
}

/// What `complete_submission` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The answer was appended. The session list should be refreshed.
    Answered,
    /// The failure was appended as an assistant message.
    Failed(ChatError),
    /// The response belonged to an abandoned conversation and was dropped.
    Discarded,
}

/// Summary of a full `submit` round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReport {
    Ignored,
    Rejected(ChatError),
    Answered,
    Failed(ChatError),
    Discarded,
}

pub struct ChatWidget {
    backend: Arc<dyn ChatBackend>,
    request_timeout: Duration,
    mode: ModeSelector,
    composer: Composer,
    conversation: Conversation,
    sidebar: SessionSidebar,
    session_id: Option<String>,
    pipeline: PipelineState,
    generation: Generation,
    in_flight: Option<CancellationToken>,
}

impl ChatWidget {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mode: ModeSelector::default(),
            composer: Composer::new(),
            conversation: Conversation::new(),
            sidebar: SessionSidebar::new(),
            session_id: None,
            pipeline: PipelineState::Idle,
            generation: Generation::default(),
            in_flight: None,
        }
    }

    /// Creates a widget seeded with the configured mode, language and repository.
    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &ClientConfig) -> Self {
        let mut widget = Self::new(backend).with_timeout(config.request_timeout());
        widget.mode.switch_mode(config.default_mode);
        if let Some(language) = &config.language {
            widget.mode.language = LanguageChoice::named(language);
        }
        widget.mode.repo = RepoTarget {
            owner: config.repo.owner.clone(),
            name: config.repo.name.clone(),
            git_ref: config.repo.git_ref.clone(),
        };
        widget
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        self.backend.clone()
    }

    pub fn mode(&self) -> &ModeSelector {
        &self.mode
    }

    /// Mutable access to the mode panels (repo fields, language choice).
    pub fn mode_mut(&mut self) -> &mut ModeSelector {
        &mut self.mode
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn sidebar(&self) -> &SessionSidebar {
        &self.sidebar
    }

    pub fn sidebar_mut(&mut self) -> &mut SessionSidebar {
        &mut self.sidebar
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn pipeline(&self) -> PipelineState {
        self.pipeline
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.pipeline.is_awaiting()
    }

    // ============================================================================
    // Mode selector and composer
    // ============================================================================

    pub fn switch_mode(&mut self, mode: ChatMode) {
        tracing::debug!("[Mode] Switching to {}", mode);
        self.mode.switch_mode(mode);
    }

    /// Switches by name, rejecting names outside the closed set of modes.
    pub fn switch_mode_named(&mut self, name: &str) -> Result<ChatMode> {
        let mode = self.mode.switch_mode_named(name)?;
        tracing::debug!("[Mode] Switching to {}", mode);
        Ok(mode)
    }

    /// Applies an edit to the composer and keeps the pipeline state in step.
    pub fn edit_composer(&mut self, edit: impl FnOnce(&mut Composer)) {
        edit(&mut self.composer);
        let has_text = !self.composer.text().trim().is_empty();
        self.pipeline.on_input(has_text);
    }

    pub fn can_submit(&self) -> bool {
        self.composer.can_submit() && !self.pipeline.is_awaiting()
    }

    // ============================================================================
    // Submission pipeline
    // ============================================================================

    /// Validates the composer and, when allowed, shows the user message and a
    /// loading placeholder and returns the job that performs the remote call.
    pub fn begin_submission(&mut self) -> SubmitOutcome {
        if self.pipeline.is_awaiting() {
            return SubmitOutcome::Ignored;
        }
        let Some(question) = self.composer.take_question() else {
            return SubmitOutcome::Ignored;
        };

        self.conversation
            .append_message(MessageRole::User, question.clone(), Vec::new());

        let request = match self.build_request(question) {
            Ok(request) => request,
            Err(err) => {
                tracing::info!("[Pipeline] Rejected locally: {}", err);
                self.conversation.append_message(
                    MessageRole::Assistant,
                    err.user_message(),
                    Vec::new(),
                );
                self.pipeline = PipelineState::Idle;
                return SubmitOutcome::Rejected(err);
            }
        };

        let placeholder = self.conversation.append_loading_placeholder();
        let ticket = Ticket {
            generation: self.generation,
            placeholder,
        };
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        self.composer.set_busy(true);
        self.pipeline = PipelineState::AwaitingResponse {
            generation: ticket.generation,
            placeholder,
        };
        tracing::info!(
            "[Pipeline] Dispatching to {} ({})",
            request.endpoint(),
            ticket.generation
        );

        SubmitOutcome::Dispatched(DispatchJob {
            backend: self.backend.clone(),
            request,
            cancel,
            timeout: self.request_timeout,
            ticket,
        })
    }

    /// Applies a finished request. Responses for an older generation are dropped.
    pub fn complete_submission(&mut self, completion: Completion) -> CompletionOutcome {
        let Completion { ticket, result } = completion;
        if ticket.generation != self.generation {
            tracing::warn!(
                "[Pipeline] Discarding response for abandoned conversation ({} != {})",
                ticket.generation,
                self.generation
            );
            return CompletionOutcome::Discarded;
        }

        self.conversation.remove_message(ticket.placeholder);
        self.in_flight = None;
        self.composer.set_busy(false);
        self.pipeline = PipelineState::Idle;
        self.pipeline
            .on_input(!self.composer.text().trim().is_empty());

        match result {
            Ok(response) => {
                let tool_calls = response.tool_calls();
                self.conversation
                    .append_message(MessageRole::Assistant, response.answer, tool_calls);
                if let Some(session_id) = response.session_id {
                    self.sidebar.mark_active(session_id.clone());
                    self.session_id = Some(session_id);
                }
                CompletionOutcome::Answered
            }
            Err(err) => {
                tracing::warn!("[Pipeline] Request failed: {}", err);
                let text = if err.is_cancelled() {
                    "Request cancelled.".to_string()
                } else {
                    err.user_message()
                };
                self.conversation
                    .append_message(MessageRole::Assistant, text, Vec::new());
                CompletionOutcome::Failed(err)
            }
        }
    }

    /// Cancels the in-flight request, if any. Its completion still has to be
    /// applied to clear the placeholder.
    pub fn cancel_in_flight(&mut self) -> bool {
        match &self.in_flight {
            Some(token) => {
                tracing::info!("[Pipeline] Cancelling in-flight request");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Runs the whole pipeline: begin, dispatch, complete, refresh sessions.
    pub async fn submit(&mut self) -> SubmitReport {
        let job = match self.begin_submission() {
            SubmitOutcome::Ignored => return SubmitReport::Ignored,
            SubmitOutcome::Rejected(err) => return SubmitReport::Rejected(err),
            SubmitOutcome::Dispatched(job) => job,
        };
        let completion = job.run().await;
        match self.complete_submission(completion) {
            CompletionOutcome::Answered => {
                self.refresh_sessions().await;
                SubmitReport::Answered
            }
            CompletionOutcome::Failed(err) => SubmitReport::Failed(err),
            CompletionOutcome::Discarded => SubmitReport::Discarded,
        }
    }

    fn build_request(&self, question: String) -> Result<QuestionRequest> {
        let session_id = self.session_id.clone();
        match self.mode.mode() {
            ChatMode::Tech => Ok(QuestionRequest::Tech(TechChatRequest {
                question,
                language: self.mode.language.value().map(str::to_string),
                session_id,
            })),
            ChatMode::Repo => {
                let (repo_owner, repo_name) = self.mode.repo.require()?;
                Ok(QuestionRequest::Repo(RepoChatRequest {
                    repo_owner,
                    repo_name,
                    question,
                    git_ref: self.mode.repo.git_ref(),
                    session_id,
                }))
            }
        }
    }

    // ============================================================================
    // Sessions
    // ============================================================================

    /// Fetches the session list. Failures are logged and keep the current list.
    pub async fn refresh_sessions(&mut self) {
        let result = self.backend.list_sessions().await;
        self.apply_session_list(result);
    }

    pub fn apply_session_list(&mut self, result: Result<Vec<SessionSummary>>) {
        match result {
            Ok(sessions) => {
                tracing::debug!("[Sessions] Loaded {} sessions", sessions.len());
                self.sidebar.replace_sessions(sessions);
            }
            Err(err) => tracing::warn!("[Sessions] Failed to load session list: {}", err),
        }
    }

    /// Loads a stored session into the conversation. Returns whether it switched.
    pub async fn select_session(&mut self, session_id: &str) -> bool {
        let result = self.backend.get_session(session_id).await;
        self.apply_session_transcript(session_id, result)
    }

    pub fn apply_session_transcript(
        &mut self,
        session_id: &str,
        result: Result<SessionTranscript>,
    ) -> bool {
        let transcript = match result {
            Ok(transcript) => transcript,
            Err(err) => {
                tracing::warn!("[Sessions] Failed to load session {}: {}", session_id, err);
                return false;
            }
        };

        self.abandon_in_flight();
        self.conversation.replace_with_transcript(&transcript);
        self.sidebar.mark_active(session_id);
        self.session_id = Some(session_id.to_string());
        tracing::info!(
            "[Sessions] Switched to session {} ({} messages)",
            session_id,
            transcript.messages.len()
        );
        true
    }

    /// Clears the conversation and the active session.
    pub fn start_new_chat(&mut self) {
        self.abandon_in_flight();
        self.session_id = None;
        self.conversation.clear();
        self.sidebar.clear_active();
        self.composer.reset();
        self.pipeline = PipelineState::Idle;
        tracing::info!("[Sessions] Started new chat ({})", self.generation);
    }

    /// Deletes a stored session, then refreshes the list.
    pub async fn delete_session(&mut self, session_id: &str) -> bool {
        let result = self.backend.delete_session(session_id).await;
        let deleted = self.apply_session_deleted(session_id, result);
        if deleted {
            self.refresh_sessions().await;
        }
        deleted
    }

    /// Applies a delete result. Returns whether the list needs refreshing.
    pub fn apply_session_deleted(&mut self, session_id: &str, result: Result<()>) -> bool {
        if let Err(err) = result {
            tracing::warn!("[Sessions] Failed to delete session {}: {}", session_id, err);
            return false;
        }
        if self.session_id.as_deref() == Some(session_id) {
            self.start_new_chat();
        }
        true
    }

    /// Moves to a new generation so any outstanding response is discarded.
    fn abandon_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        self.generation = self.generation.next();
        self.composer.set_busy(false);
        self.pipeline = PipelineState::Idle;
        self.pipeline
            .on_input(!self.composer.text().trim().is_empty());
    }
}
