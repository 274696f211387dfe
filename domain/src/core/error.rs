//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Conversation is empty")]
    EmptyConversation,

    #[error("No message at index {0}")]
    MessageNotFound(usize),

    #[error("Message {0} is closed: its response has ended")]
    MessageClosed(usize),

    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid response mode: {0}")]
    InvalidResponseMode(String),
}
