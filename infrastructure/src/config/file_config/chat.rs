//! Chat behaviour configuration from TOML (`[chat]` section)

use super::ConfigIssue;
use gemchat_domain::ResponseMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// "streaming" (default) or "single_shot"
    pub mode: String,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            mode: ResponseMode::default().as_str().to_string(),
        }
    }
}

impl FileChatConfig {
    pub fn parse_mode(&self) -> (ResponseMode, Vec<ConfigIssue>) {
        match self.mode.parse::<ResponseMode>() {
            Ok(mode) => (mode, Vec::new()),
            Err(_) => (
                ResponseMode::default(),
                vec![ConfigIssue::warning(
                    "chat.mode",
                    format!(
                        "chat.mode: unknown value '{}', falling back to 'streaming'",
                        self.mode
                    ),
                )],
            ),
        }
    }
}
