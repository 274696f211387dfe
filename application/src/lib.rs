//! Application layer for gemchat
//!
//! This crate contains the conversation state store, the prompt submission
//! use case and the port definitions. It depends only on the domain layer.

pub mod ports;
pub mod state;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    conversation_observer::ConversationObserver,
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
};
pub use state::{ChatSnapshot, ChatStore, LoadingGuard};
pub use use_cases::submit_prompt::{
    RejectReason, SubmitError, SubmitOutcome, SubmitPromptUseCase,
};
