//! Infrastructure layer for gemchat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Gemini REST gateway, configuration
//! file loading and the JSONL conversation logger.

pub mod config;
pub mod gemini;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, FileChatConfig, FileConfig, FileGeminiConfig, FileLoggingConfig,
    FileOutputConfig, FileReplConfig, Severity,
};
pub use gemini::{
    error::{GeminiError, Result},
    gateway::{GeminiGateway, GeminiSettings},
};
pub use logging::JsonlConversationLogger;
