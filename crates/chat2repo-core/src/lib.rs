//! Domain model of the chat2repo client.
//!
//! Everything in this crate is synchronous and free of I/O: message and
//! session types, the mode selector, the composer, the conversation list
//! with its rendered projection, Markdown-lite formatting and relative time
//! labels. The remote calls live in `chat2repo-interaction` and the state
//! machine tying them together in `chat2repo-application`.

pub mod composer;
pub mod conversation;
pub mod error;
pub mod markup;
pub mod message;
pub mod mode;
pub mod pipeline;
pub mod session;
pub mod sidebar;
pub mod time;

// Re-export common types
pub use error::{ChatError, Result};
pub use message::{Message, MessageId, MessageRole, ToolCall};
pub use mode::ChatMode;
