//! The ordered message list and its rendered counterpart.
//!
//! `Conversation` keeps the committed messages and their pre-rendered
//! presentation side by side. Every mutation updates both lists in the same
//! call, so the rendered order always equals the model order.

use crate::markup::{self, Fragment};
use crate::message::{Message, MessageId, MessageIdGenerator, MessageRole, ToolCall};
use crate::session::SessionTranscript;
use chrono::{DateTime, Utc};

/// Presentation of a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    /// Three-dot typing indicator.
    Loading,
    Formatted(Vec<Fragment>),
}

/// A message as it appears on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub id: MessageId,
    pub role: MessageRole,
    pub body: RenderedBody,
    pub tool_calls: Vec<ToolCall>,
    pub timestamp: DateTime<Utc>,
}

/// Formats a message for display. Never fails: malformed markup stays literal.
pub fn render_message(message: &Message) -> RenderedMessage {
    let body = if message.loading {
        RenderedBody::Loading
    } else {
        RenderedBody::Formatted(markup::parse(&message.content))
    };
    RenderedMessage {
        id: message.id,
        role: message.role,
        body,
        tool_calls: message.tool_calls.clone(),
        timestamp: message.timestamp,
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    rendered: Vec<RenderedMessage>,
    ids: MessageIdGenerator,
    /// Rows scrolled up from the newest message. Zero follows the tail.
    scroll_from_bottom: u16,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn rendered(&self) -> &[RenderedMessage] {
        &self.rendered
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Empty conversations show the welcome screen instead of a list.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn append_message(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
    ) -> MessageId {
        self.append_message_at(role, content, tool_calls, Utc::now())
    }

    /// Appends a message carrying an explicit timestamp, e.g. from a transcript.
    pub fn append_message_at(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
        timestamp: DateTime<Utc>,
    ) -> MessageId {
        let id = self.ids.next_at(Utc::now());
        self.push(Message::new(id, role, content, tool_calls, timestamp))
    }

    pub fn append_loading_placeholder(&mut self) -> MessageId {
        let now = Utc::now();
        let id = self.ids.next_at(now);
        self.push(Message::placeholder(id, now))
    }

    /// Removes a message from both lists. Returns whether anything was removed.
    pub fn remove_message(&mut self, id: MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.rendered.retain(|r| r.id != id);
        self.messages.len() != before
    }

    /// Replaces the whole conversation with a stored transcript.
    pub fn replace_with_transcript(&mut self, transcript: &SessionTranscript) {
        self.clear();
        let fallback = Utc::now();
        for entry in &transcript.messages {
            self.append_message_at(
                entry.role,
                entry.content.clone(),
                Vec::new(),
                entry.timestamp.unwrap_or(fallback),
            );
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.rendered.clear();
        self.scroll_from_bottom = 0;
    }

    pub fn has_placeholder(&self) -> bool {
        self.messages.iter().any(|m| m.loading)
    }

    pub fn scroll_from_bottom(&self) -> u16 {
        self.scroll_from_bottom
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(rows);
    }

    /// Caps the offset once the front end knows how tall the content is.
    pub fn clamp_scroll(&mut self, max_rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.min(max_rows);
    }

    fn push(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.rendered.push(render_message(&message));
        self.messages.push(message);
        self.scroll_from_bottom = 0;
        id
    }
}
