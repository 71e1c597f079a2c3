//! Application layer for chat2repo.
//!
//! This crate provides the `ChatWidget`, which coordinates the domain state
//! from `chat2repo-core` with the remote operations of `chat2repo-interaction`.

pub mod widget;

pub use widget::{
    ChatWidget, Completion, CompletionOutcome, DispatchJob, SubmitOutcome, SubmitReport, Ticket,
};
