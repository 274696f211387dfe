//! Configuration file loading for gemchat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables prefixed `GEMCHAT_` (`GEMCHAT_GEMINI__MODEL=...`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./gemchat.toml` or `./.gemchat.toml`
//! 4. Global: `$XDG_CONFIG_HOME/gemchat/config.toml` (or platform equivalent)
//! 5. Default values
//!
//! CLI flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileChatConfig, FileConfig, FileGeminiConfig, FileLoggingConfig,
    FileOutputConfig, FileReplConfig, Severity,
};
pub use loader::ConfigLoader;
