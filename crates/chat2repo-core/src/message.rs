//! Conversation message types.
//!
//! This module contains the in-memory message entries shown in the
//! conversation, including the transient loading placeholder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a message within one conversation.
///
/// Ids are millisecond timestamps, forced strictly increasing by
/// [`MessageIdGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out monotonic timestamp ids.
#[derive(Debug, Default, Clone)]
pub struct MessageIdGenerator {
    last: i64,
}

impl MessageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an id derived from `now`, bumped past the previous id if needed.
    pub fn next_at(&mut self, now: DateTime<Utc>) -> MessageId {
        let candidate = now.timestamp_millis();
        self.last = if candidate > self.last {
            candidate
        } else {
            self.last + 1
        };
        MessageId(self.last)
    }
}

/// Represents the author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Answer (or error report) from the backend.
    Assistant,
}

impl MessageRole {
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "You",
            MessageRole::Assistant => "Assistant",
        }
    }
}

/// An auxiliary action the backend performed while answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name.
    pub tool: String,
    /// Arguments, flattened to text.
    pub args: String,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: args.into(),
        }
    }
}

/// A single entry of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    /// Raw Markdown-like text. Empty for a loading placeholder.
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    pub timestamp: DateTime<Utc>,
    /// Set on the transient placeholder shown while awaiting a response.
    #[serde(default)]
    pub loading: bool,
}

impl Message {
    pub fn new(
        id: MessageId,
        role: MessageRole,
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            tool_calls,
            timestamp,
            loading: false,
        }
    }

    pub fn placeholder(id: MessageId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content: String::new(),
            tool_calls: Vec::new(),
            timestamp,
            loading: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ids_stay_monotonic_within_one_millisecond() {
        let mut ids = MessageIdGenerator::new();
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let a = ids.next_at(now);
        let b = ids.next_at(now);
        let c = ids.next_at(now);

        assert_eq!(a, MessageId(1_700_000_000_000));
        assert!(a < b && b < c);
    }

    #[test]
    fn ids_never_go_backwards_when_the_clock_does() {
        let mut ids = MessageIdGenerator::new();
        let later = Utc.timestamp_millis_opt(2_000).unwrap();
        let earlier = Utc.timestamp_millis_opt(1_000).unwrap();

        let a = ids.next_at(later);
        let b = ids.next_at(earlier);
        assert!(b > a);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, MessageRole::User);
    }
}
