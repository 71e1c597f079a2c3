use async_trait::async_trait;
use chat2repo_application::{ChatWidget, CompletionOutcome, SubmitOutcome, SubmitReport};
use chat2repo_core::conversation::RenderedBody;
use chat2repo_core::session::{SessionSummary, SessionTranscript, TranscriptMessage};
use chat2repo_core::{ChatError, ChatMode, MessageRole, Result};
use chat2repo_interaction::api::{HealthResponse, ToolCallRecord};
use chat2repo_interaction::{ChatBackend, ChatResponse, RepoChatRequest, TechChatRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Mock ChatBackend for testing
#[derive(Default)]
struct MockBackend {
    tech_requests: Mutex<Vec<TechChatRequest>>,
    repo_requests: Mutex<Vec<RepoChatRequest>>,
    list_calls: Mutex<usize>,
    answer: Mutex<Option<Result<ChatResponse>>>,
    delay: Option<Duration>,
    sessions: Mutex<Option<Result<Vec<SessionSummary>>>>,
    transcripts: Mutex<HashMap<String, SessionTranscript>>,
    deleted: Mutex<Vec<String>>,
}

impl MockBackend {
    fn answering(answer: &str, session_id: &str) -> Self {
        let backend = Self::default();
        *backend.answer.lock().unwrap() = Some(Ok(ChatResponse {
            answer: answer.to_string(),
            tool_calls: None,
            session_id: Some(session_id.to_string()),
        }));
        backend
    }

    fn failing(err: ChatError) -> Self {
        let backend = Self::default();
        *backend.answer.lock().unwrap() = Some(Err(err));
        backend
    }

    fn slow(delay: Duration) -> Self {
        let mut backend = Self::answering("late", "s-late");
        backend.delay = Some(delay);
        backend
    }

    fn chat_calls(&self) -> usize {
        self.tech_requests.lock().unwrap().len() + self.repo_requests.lock().unwrap().len()
    }

    async fn respond(&self) -> Result<ChatResponse> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ChatError::transport("no answer configured")))
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn ask_tech(&self, request: &TechChatRequest) -> Result<ChatResponse> {
        self.tech_requests.lock().unwrap().push(request.clone());
        self.respond().await
    }

    async fn ask_repo(&self, request: &RepoChatRequest) -> Result<ChatResponse> {
        self.repo_requests.lock().unwrap().push(request.clone());
        self.respond().await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        *self.list_calls.lock().unwrap() += 1;
        self.sessions
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionTranscript> {
        self.transcripts
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| ChatError::api(404, Some("Session not found".into())))
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(session_id.to_string());
        Ok(())
    }

    async fn health(&self) -> Result<HealthResponse> {
        Ok(HealthResponse {
            status: "healthy".into(),
        })
    }
}

fn summary(id: &str, count: usize) -> SessionSummary {
    SessionSummary {
        session_id: id.to_string(),
        message_count: count,
        created_at: None,
        updated_at: None,
    }
}

fn transcript(pairs: &[(MessageRole, &str)]) -> SessionTranscript {
    SessionTranscript {
        session_id: None,
        messages: pairs
            .iter()
            .map(|(role, content)| TranscriptMessage {
                role: *role,
                content: content.to_string(),
                timestamp: None,
            })
            .collect(),
        created_at: None,
        updated_at: None,
    }
}

fn widget_with(backend: &Arc<MockBackend>) -> ChatWidget {
    ChatWidget::new(backend.clone())
}

fn type_question(widget: &mut ChatWidget, text: &str) {
    widget.edit_composer(|c| c.set_text(text));
}

fn contents(widget: &ChatWidget) -> Vec<(MessageRole, String)> {
    widget
        .conversation()
        .messages()
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect()
}

#[tokio::test]
async fn test_tech_question_round_trip() {
    let backend = Arc::new(MockBackend::answering("Use `Arc<Mutex<T>>`", "s-1"));
    *backend.sessions.lock().unwrap() = Some(Ok(vec![summary("s-1", 2)]));
    let mut widget = widget_with(&backend);
    widget.mode_mut().language.next();

    type_question(&mut widget, "  How do I share state?  ");
    let report = widget.submit().await;

    assert_eq!(report, SubmitReport::Answered);
    assert_eq!(
        contents(&widget),
        vec![
            (MessageRole::User, "How do I share state?".to_string()),
            (MessageRole::Assistant, "Use `Arc<Mutex<T>>`".to_string()),
        ]
    );
    assert_eq!(widget.session_id(), Some("s-1"));
    assert!(widget.sidebar().is_active("s-1"));
    assert_eq!(widget.sidebar().sessions().len(), 1);
    assert!(!widget.is_awaiting_response());
    assert!(widget.composer().text().is_empty());

    let requests = backend.tech_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].language.as_deref(), Some("Python"));
    assert_eq!(requests[0].session_id, None);
}

#[tokio::test]
async fn test_session_id_is_reused_for_follow_up_questions() {
    let backend = Arc::new(MockBackend::answering("ok", "s-7"));
    let mut widget = widget_with(&backend);

    type_question(&mut widget, "first");
    widget.submit().await;
    type_question(&mut widget, "second");
    widget.submit().await;

    let requests = backend.tech_requests.lock().unwrap();
    assert_eq!(requests[0].session_id, None);
    assert_eq!(requests[1].session_id.as_deref(), Some("s-7"));
}

#[tokio::test]
async fn test_blank_question_never_reaches_backend() {
    let backend = Arc::new(MockBackend::answering("unused", "s"));
    let mut widget = widget_with(&backend);

    for blank in ["", "   ", "\n\t  \n"] {
        type_question(&mut widget, blank);
        assert_eq!(widget.submit().await, SubmitReport::Ignored);
    }

    assert_eq!(backend.chat_calls(), 0);
    assert!(widget.conversation().is_empty());
}

#[tokio::test]
async fn test_repo_mode_requires_owner_and_name() {
    let backend = Arc::new(MockBackend::answering("unused", "s"));
    let mut widget = widget_with(&backend);
    widget.switch_mode(ChatMode::Repo);
    widget.mode_mut().repo.owner = "openharmony".into();

    type_question(&mut widget, "Where is the build script?");
    let report = widget.submit().await;

    assert!(matches!(report, SubmitReport::Rejected(ChatError::Validation(_))));
    assert_eq!(backend.chat_calls(), 0);
    assert!(!widget.is_awaiting_response());
    assert!(!widget.conversation().has_placeholder());

    let messages = contents(&widget);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].0, MessageRole::User);
    assert_eq!(messages[1].0, MessageRole::Assistant);
    assert!(messages[1].1.contains("repository owner"));
}

#[tokio::test]
async fn test_repo_request_carries_trimmed_coordinates() {
    let backend = Arc::new(MockBackend::answering("See build.sh", "s-r"));
    let mut widget = widget_with(&backend);
    widget.switch_mode_named("repo").unwrap();
    widget.mode_mut().repo.owner = " openharmony ".into();
    widget.mode_mut().repo.name = "docs".into();
    widget.mode_mut().repo.git_ref = "  ".into();

    type_question(&mut widget, "Where is the build script?");
    assert_eq!(widget.submit().await, SubmitReport::Answered);

    let requests = backend.repo_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].repo_owner, "openharmony");
    assert_eq!(requests[0].repo_name, "docs");
    assert_eq!(requests[0].git_ref, None);
    assert!(backend.tech_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_mode_name_is_rejected() {
    let backend = Arc::new(MockBackend::default());
    let mut widget = widget_with(&backend);

    let err = widget.switch_mode_named("search").unwrap_err();
    assert!(matches!(err, ChatError::UnknownMode(_)));
    assert_eq!(widget.mode().mode(), ChatMode::Tech);
}

#[tokio::test]
async fn test_second_submit_while_awaiting_is_ignored() {
    let backend = Arc::new(MockBackend::answering("only once", "s-1"));
    let mut widget = widget_with(&backend);

    type_question(&mut widget, "first");
    let SubmitOutcome::Dispatched(job) = widget.begin_submission() else {
        panic!("first submission should dispatch");
    };
    assert!(widget.is_awaiting_response());
    assert!(widget.conversation().has_placeholder());

    type_question(&mut widget, "second");
    assert!(!widget.can_submit());
    assert!(matches!(widget.begin_submission(), SubmitOutcome::Ignored));
    assert_eq!(widget.submit().await, SubmitReport::Ignored);
    assert_eq!(widget.composer().text(), "second", "ignored text is kept");

    let completion = job.run().await;
    assert_eq!(widget.complete_submission(completion), CompletionOutcome::Answered);

    assert_eq!(backend.chat_calls(), 1);
    assert!(widget.can_submit());
}

#[tokio::test]
async fn test_failure_replaces_placeholder_with_error_message() {
    let backend = Arc::new(MockBackend::failing(ChatError::api(
        500,
        Some("Failed to reach the model".into()),
    )));
    let mut widget = widget_with(&backend);

    type_question(&mut widget, "Why?");
    let report = widget.submit().await;

    assert!(matches!(report, SubmitReport::Failed(ChatError::Api { status: 500, .. })));
    let messages = contents(&widget);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].0, MessageRole::Assistant);
    assert!(messages[1].1.contains("Failed to reach the model"));
    assert!(!widget.conversation().has_placeholder());
    assert!(!widget.is_awaiting_response());
    assert_eq!(widget.session_id(), None);
    assert_eq!(*backend.list_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_tool_calls_are_attached_to_the_answer() {
    let backend = Arc::new(MockBackend::default());
    *backend.answer.lock().unwrap() = Some(Ok(ChatResponse {
        answer: "Read the README".into(),
        tool_calls: Some(vec![ToolCallRecord {
            tool: "get_file_content".into(),
            args: serde_json::Value::String("README.md".into()),
        }]),
        session_id: Some("s".into()),
    }));
    let mut widget = widget_with(&backend);

    type_question(&mut widget, "What does it do?");
    widget.submit().await;

    let rendered = widget.conversation().rendered().last().unwrap();
    assert_eq!(rendered.tool_calls.len(), 1);
    assert_eq!(rendered.tool_calls[0].tool, "get_file_content");
    assert_eq!(rendered.tool_calls[0].args, "README.md");
    assert!(matches!(rendered.body, RenderedBody::Formatted(_)));
}

#[tokio::test]
async fn test_new_chat_discards_stale_response() {
    let backend = Arc::new(MockBackend::answering("too late", "s-old"));
    let mut widget = widget_with(&backend);

    type_question(&mut widget, "slow question");
    let SubmitOutcome::Dispatched(job) = widget.begin_submission() else {
        panic!("should dispatch");
    };

    widget.start_new_chat();
    assert!(!widget.is_awaiting_response());
    assert!(widget.composer().text().is_empty());

    let completion = job.run().await;
    assert_eq!(widget.complete_submission(completion), CompletionOutcome::Discarded);
    assert!(widget.conversation().is_empty());
    assert_eq!(widget.session_id(), None);
}

#[tokio::test]
async fn test_cancel_clears_busy_state() {
    let backend = Arc::new(MockBackend::slow(Duration::from_secs(30)));
    let mut widget = widget_with(&backend);

    type_question(&mut widget, "will be cancelled");
    let SubmitOutcome::Dispatched(job) = widget.begin_submission() else {
        panic!("should dispatch");
    };
    let handle = tokio::spawn(job.run());

    assert!(widget.cancel_in_flight());
    let completion = handle.await.unwrap();
    let outcome = widget.complete_submission(completion);

    assert_eq!(outcome, CompletionOutcome::Failed(ChatError::Cancelled));
    assert!(!widget.is_awaiting_response());
    assert!(!widget.composer().is_busy());
    assert!(!widget.conversation().has_placeholder());
    assert!(!widget.cancel_in_flight(), "nothing left to cancel");
}

#[tokio::test]
async fn test_timeout_fails_the_request() {
    let backend = Arc::new(MockBackend::slow(Duration::from_secs(30)));
    let mut widget = widget_with(&backend).with_timeout(Duration::from_millis(20));

    type_question(&mut widget, "hangs forever");
    let report = widget.submit().await;

    assert!(matches!(report, SubmitReport::Failed(ChatError::Timeout { .. })));
    assert!(!widget.is_awaiting_response());
}

#[tokio::test]
async fn test_refresh_failure_keeps_existing_list() {
    let backend = Arc::new(MockBackend::default());
    *backend.sessions.lock().unwrap() = Some(Ok(vec![summary("a", 2), summary("b", 4)]));
    let mut widget = widget_with(&backend);

    widget.refresh_sessions().await;
    assert_eq!(widget.sidebar().sessions().len(), 2);

    *backend.sessions.lock().unwrap() = Some(Err(ChatError::transport("connection refused")));
    widget.refresh_sessions().await;
    assert_eq!(widget.sidebar().sessions().len(), 2);
    assert!(widget.conversation().is_empty(), "no user-visible error");
}

#[tokio::test]
async fn test_select_session_replaces_conversation() {
    let backend = Arc::new(MockBackend::default());
    *backend.sessions.lock().unwrap() = Some(Ok(vec![summary("a", 2), summary("b", 2)]));
    backend.transcripts.lock().unwrap().insert(
        "b".into(),
        transcript(&[
            (MessageRole::User, "What is **b**?"),
            (MessageRole::Assistant, "A session."),
        ]),
    );
    let mut widget = widget_with(&backend);
    widget.refresh_sessions().await;
    widget
        .conversation_mut()
        .append_message(MessageRole::User, "unsaved draft", Vec::new());

    assert!(widget.select_session("b").await);

    assert_eq!(
        contents(&widget),
        vec![
            (MessageRole::User, "What is **b**?".to_string()),
            (MessageRole::Assistant, "A session.".to_string()),
        ]
    );
    assert_eq!(widget.session_id(), Some("b"));
    assert!(widget.sidebar().is_active("b"));
    assert_eq!(widget.sidebar().active_count(), 1);
}

#[tokio::test]
async fn test_select_missing_session_leaves_state_unchanged() {
    let backend = Arc::new(MockBackend::answering("ok", "s-1"));
    let mut widget = widget_with(&backend);
    type_question(&mut widget, "hello");
    widget.submit().await;
    let before = contents(&widget);

    assert!(!widget.select_session("gone").await);

    assert_eq!(contents(&widget), before);
    assert_eq!(widget.session_id(), Some("s-1"));
}

#[tokio::test]
async fn test_new_chat_resets_everything() {
    let backend = Arc::new(MockBackend::answering("ok", "s-1"));
    *backend.sessions.lock().unwrap() = Some(Ok(vec![summary("s-1", 2)]));
    let mut widget = widget_with(&backend);
    type_question(&mut widget, "hello");
    widget.submit().await;
    type_question(&mut widget, "draft");
    assert!(widget.sidebar().is_active("s-1"));

    widget.start_new_chat();

    assert!(widget.conversation().is_empty());
    assert!(widget.conversation().rendered().is_empty());
    assert_eq!(widget.session_id(), None);
    assert_eq!(widget.sidebar().active_count(), 0);
    assert!(widget.composer().text().is_empty());
    assert_eq!(widget.sidebar().sessions().len(), 1, "list itself is kept");
}

#[tokio::test]
async fn test_deleting_active_session_starts_new_chat() {
    let backend = Arc::new(MockBackend::answering("ok", "s-1"));
    let mut widget = widget_with(&backend);
    type_question(&mut widget, "hello");
    widget.submit().await;
    let lists_before = *backend.list_calls.lock().unwrap();

    assert!(widget.delete_session("s-1").await);

    assert_eq!(backend.deleted.lock().unwrap().as_slice(), ["s-1"]);
    assert_eq!(widget.session_id(), None);
    assert!(widget.conversation().is_empty());
    assert_eq!(*backend.list_calls.lock().unwrap(), lists_before + 1);
}
