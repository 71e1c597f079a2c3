//! Submission pipeline states.

use crate::message::MessageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counter bumped whenever the conversation is replaced or reset.
///
/// A response is only applied if it was dispatched under the generation that
/// is still current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// `idle → composing → awaiting-response → idle`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineState {
    #[default]
    Idle,
    /// The composer holds text that could be submitted.
    Composing,
    /// One request is in flight; its placeholder is on screen.
    AwaitingResponse {
        generation: Generation,
        placeholder: MessageId,
    },
}

impl PipelineState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, PipelineState::AwaitingResponse { .. })
    }

    /// Follows composer edits. Has no effect while awaiting a response.
    pub fn on_input(&mut self, has_text: bool) {
        if self.is_awaiting() {
            return;
        }
        *self = if has_text {
            PipelineState::Composing
        } else {
            PipelineState::Idle
        };
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Composing => "composing",
            PipelineState::AwaitingResponse { .. } => "awaiting response",
        }
    }
}
