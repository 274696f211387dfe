//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! String-typed fields are parsed into domain types by `parse_*` helpers
//! that report problems as [`ConfigIssue`]s instead of failing the load.

mod chat;
mod gemini;
mod logging;
mod output;
mod repl;

pub use chat::FileChatConfig;
pub use gemini::FileGeminiConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use repl::FileReplConfig;

use serde::{Deserialize, Serialize};

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: a fallback value is used instead.
    Warning,
}

/// A detected problem in the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Gemini API settings
    pub gemini: FileGeminiConfig,
    /// Chat behaviour
    pub chat: FileChatConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Conversation log settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.gemini.parse_model().1);
        issues.extend(self.gemini.validate());
        issues.extend(self.chat.parse_mode().1);
        issues
    }

    /// Effective configuration as TOML, with an inline API key masked.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        if shown.gemini.api_key.is_some() {
            shown.gemini.api_key = Some("********".to_string());
        }
        toml::to_string_pretty(&shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemchat_domain::ResponseMode;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[gemini]
model = "gemini-2.0-flash"
api_key_env = "MY_GEMINI_KEY"
timeout_secs = 30

[chat]
mode = "single_shot"

[output]
color = false

[repl]
show_progress = false
history_file = "~/.local/share/gemchat/history.txt"

[logging]
conversation_log = "/tmp/gemchat.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.api_key_env, "MY_GEMINI_KEY");
        assert_eq!(config.gemini.timeout_secs, 30);
        assert_eq!(config.chat.parse_mode().0, ResponseMode::SingleShot);
        assert!(!config.output.color);
        assert!(!config.repl.show_progress);
        assert_eq!(
            config.logging.conversation_log.as_deref(),
            Some("/tmp/gemchat.jsonl")
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[gemini]
model = "gemini-pro"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gemini.model, "gemini-pro");
        // Defaults should apply
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.chat.parse_mode().0, ResponseMode::Streaming);
        assert!(config.output.color);
        assert!(config.repl.show_progress);
    }

    #[test]
    fn test_redacted_toml_masks_key_and_round_trips() {
        let mut config = FileConfig::default();
        config.gemini.api_key = Some("secret-key".to_string());

        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("[gemini]"));

        let parsed: FileConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.gemini.api_key.as_deref(), Some("********"));
        assert_eq!(parsed.chat, config.chat);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let mut config = FileConfig::default();
        config.gemini.model = "  ".to_string();
        config.gemini.timeout_secs = 0;
        config.chat.mode = "batch".to_string();

        let issues = config.validate();
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["gemini.model", "gemini.timeout_secs", "chat.mode"]);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
    }
}
