//! Domain layer for gemchat
//!
//! This crate contains the conversation entities and the state of an
//! in-flight streamed response. It has no dependencies on infrastructure
//! or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Conversation**: an append-only transcript of user and assistant turns
//! - **Placeholder**: the empty assistant turn appended on submission and
//!   filled in as fragments arrive
//! - **Stream session**: the accumulator for one response, terminated by
//!   completion or failure

pub mod config;
pub mod core;
pub mod session;

// Re-export commonly used types
pub use crate::config::ResponseMode;
pub use crate::core::{error::DomainError, model::Model, prompt::Prompt};
pub use crate::session::{
    RESPONSE_FAILURE_TEXT, SESSION_ERROR_TEXT,
    entities::{Conversation, Message, Role},
    stream::{StreamEvent, StreamSession, StreamStatus},
};
