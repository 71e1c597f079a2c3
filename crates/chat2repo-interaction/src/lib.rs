//! Remote side of the chat2repo client: wire types, the backend trait and
//! its HTTP implementation, plus client configuration.

pub mod api;
pub mod backend;
pub mod config;
pub mod http_backend;

pub use api::{ChatResponse, QuestionRequest, RepoChatRequest, TechChatRequest};
pub use backend::ChatBackend;
pub use config::ClientConfig;
pub use http_backend::HttpChatBackend;
