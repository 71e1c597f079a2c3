use chat2repo_application::{ChatWidget, Completion, CompletionOutcome, SubmitOutcome};
use chat2repo_core::ChatMode;
use chat2repo_core::pipeline::Generation;
use chat2repo_core::Result;
use chat2repo_core::session::{SessionSummary, SessionTranscript};
use tokio::sync::mpsc;

/// Example prompts offered on the welcome screen, per mode.
pub const TECH_EXAMPLES: &[&str] = &[
    "How do I build a thread pool in Rust?",
    "Recommend an open-source JSON parser for C++",
    "What is the difference between a process and a thread?",
    "How can I profile a slow Python script?",
];

pub const REPO_EXAMPLES: &[&str] = &[
    "What does this repository do?",
    "Where is the entry point of the project?",
    "Summarize the directory structure",
    "How do I build and run the tests?",
];

/// Which pane receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    Language,
    RepoOwner,
    RepoName,
    RepoRef,
    Sidebar,
}

/// The conversation a session load was requested from. A transcript whose
/// stamp no longer matches arrived after the user moved on and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewStamp {
    generation: Generation,
    edits: u64,
}

/// Results of background work, delivered back to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    Completed(Completion),
    Sessions(Result<Vec<SessionSummary>>),
    Transcript {
        session_id: String,
        stamp: ViewStamp,
        result: Result<SessionTranscript>,
    },
    Deleted {
        session_id: String,
        result: Result<()>,
    },
}

pub struct App {
    pub widget: ChatWidget,
    pub focus: Focus,
    pub should_quit: bool,
    pub tick: u64,
    pub base_url: String,
    pub status_message: Option<String>,
    edits: u64,
    events_tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(widget: ChatWidget, base_url: String) -> (Self, mpsc::Receiver<AppEvent>) {
        let (events_tx, events_rx) = mpsc::channel(32);
        let app = Self {
            widget,
            focus: Focus::Composer,
            should_quit: false,
            tick: 0,
            base_url,
            status_message: None,
            edits: 0,
            events_tx,
        };
        (app, events_rx)
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn examples(&self) -> &'static [&'static str] {
        match self.widget.mode().mode() {
            ChatMode::Tech => TECH_EXAMPLES,
            ChatMode::Repo => REPO_EXAMPLES,
        }
    }

    /// Focus order for Tab; the config fields depend on the mode.
    fn focus_order(&self) -> &'static [Focus] {
        match self.widget.mode().mode() {
            ChatMode::Tech => &[Focus::Composer, Focus::Language, Focus::Sidebar],
            ChatMode::Repo => &[
                Focus::Composer,
                Focus::RepoOwner,
                Focus::RepoName,
                Focus::RepoRef,
                Focus::Sidebar,
            ],
        }
    }

    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    pub fn focus_previous(&mut self) {
        let len = self.focus_order().len();
        self.step_focus(len - 1);
    }

    fn step_focus(&mut self, step: usize) {
        let order = self.focus_order();
        let index = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(index + step) % order.len()];
    }

    pub fn toggle_mode(&mut self) {
        let mode = self.widget.mode().mode().toggled();
        self.widget.switch_mode(mode);
        if !self.focus_order().contains(&self.focus) {
            self.focus = Focus::Composer;
        }
        self.status_message = Some(format!("Switched to {}", mode.title()));
    }

    /// The repo text field under focus, if any.
    pub fn focused_field(&mut self) -> Option<&mut String> {
        let repo = &mut self.widget.mode_mut().repo;
        match self.focus {
            Focus::RepoOwner => Some(&mut repo.owner),
            Focus::RepoName => Some(&mut repo.name),
            Focus::RepoRef => Some(&mut repo.git_ref),
            _ => None,
        }
    }

    fn view_stamp(&self) -> ViewStamp {
        ViewStamp {
            generation: self.widget.generation(),
            edits: self.edits,
        }
    }

    pub fn use_example(&mut self, index: usize) {
        if self.widget.is_awaiting_response() || !self.widget.conversation().is_empty() {
            return;
        }
        if let Some(example) = self.examples().get(index) {
            self.widget.edit_composer(|composer| composer.set_text(*example));
            self.focus = Focus::Composer;
        }
    }

    // ============================================================================
    // Background work
    // ============================================================================

    pub fn submit(&mut self) {
        self.status_message = None;
        let outcome = self.widget.begin_submission();
        if !matches!(outcome, SubmitOutcome::Ignored) {
            self.edits += 1;
        }
        match outcome {
            SubmitOutcome::Ignored => {}
            SubmitOutcome::Rejected(err) => {
                tracing::debug!("[App] Submission rejected: {}", err);
            }
            SubmitOutcome::Dispatched(job) => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let completion = job.run().await;
                    let _ = tx.send(AppEvent::Completed(completion)).await;
                });
            }
        }
    }

    pub fn cancel(&mut self) -> bool {
        let cancelled = self.widget.cancel_in_flight();
        if cancelled {
            self.status_message = Some("Cancelling request...".to_string());
        }
        cancelled
    }

    pub fn refresh_sessions(&self) {
        let backend = self.widget.backend();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.list_sessions().await;
            let _ = tx.send(AppEvent::Sessions(result)).await;
        });
    }

    pub fn open_highlighted_session(&mut self) {
        let Some(session_id) = self
            .widget
            .sidebar()
            .highlighted()
            .map(|s| s.session_id.clone())
        else {
            return;
        };
        self.status_message = Some(format!("Loading session {session_id}..."));
        self.edits += 1;
        let stamp = self.view_stamp();
        let backend = self.widget.backend();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.get_session(&session_id).await;
            let _ = tx.send(AppEvent::Transcript {
                    session_id,
                    stamp,
                    result,
                })
                .await;
        });
    }

    pub fn delete_highlighted_session(&mut self) {
        let Some(session_id) = self
            .widget
            .sidebar()
            .highlighted()
            .map(|s| s.session_id.clone())
        else {
            return;
        };
        let backend = self.widget.backend();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.delete_session(&session_id).await;
            let _ = tx.send(AppEvent::Deleted { session_id, result }).await;
        });
    }

    pub fn new_chat(&mut self) {
        self.edits += 1;
        self.widget.start_new_chat();
        self.focus = Focus::Composer;
        self.status_message = Some("Started a new chat".to_string());
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Completed(completion) => match self.widget.complete_submission(completion) {
                CompletionOutcome::Answered => self.refresh_sessions(),
                CompletionOutcome::Failed(err) => {
                    self.status_message = Some(err.to_string());
                }
                CompletionOutcome::Discarded => {}
            },
            AppEvent::Sessions(result) => {
                if let Err(err) = &result {
                    self.status_message = Some(format!("Could not load sessions: {err}"));
                }
                self.widget.apply_session_list(result);
            }
            AppEvent::Transcript {
                session_id,
                stamp,
                result,
            } => {
                if stamp != self.view_stamp() {
                    tracing::debug!("[Sessions] Dropping stale transcript for {}", session_id);
                    return;
                }
                if let Err(err) = &result {
                    self.status_message = Some(format!("Could not load session: {err}"));
                }
                if self.widget.apply_session_transcript(&session_id, result) {
                    self.status_message = None;
                    self.focus = Focus::Composer;
                }
            }
            AppEvent::Deleted { session_id, result } => {
                if let Err(err) = &result {
                    self.status_message = Some(format!("Could not delete session: {err}"));
                }
                if self.widget.apply_session_deleted(&session_id, result) {
                    self.status_message = Some(format!("Deleted session {session_id}"));
                    self.refresh_sessions();
                }
            }
        }
    }
}
