//! Gemini API configuration from TOML (`[gemini]` section)

use super::ConfigIssue;
use gemchat_domain::Model;
use serde::{Deserialize, Serialize};

/// Gemini API provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    pub api_key: Option<String>,
    /// Base URL for the Generative Language API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Connect timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: Model::DEFAULT_NAME.to_string(),
            timeout_secs: 60,
        }
    }
}

impl FileGeminiConfig {
    /// Resolve the API key from the process environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key: an explicit `api_key` wins, otherwise the
    /// variable named by `api_key_env` is looked up. Blank values count
    /// as missing.
    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| lookup(&self.api_key_env))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Parse the configured model, falling back to the default.
    pub fn parse_model(&self) -> (Model, Vec<ConfigIssue>) {
        match self.model.parse::<Model>() {
            Ok(model) => (model, Vec::new()),
            Err(_) => (
                Model::default(),
                vec![ConfigIssue::warning(
                    "gemini.model",
                    format!(
                        "gemini.model is empty, falling back to '{}'",
                        Model::DEFAULT_NAME
                    ),
                )],
            ),
        }
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "gemini.timeout_secs",
                "gemini.timeout_secs is 0, requests will use no connect timeout",
            ));
        }
        if self.base_url.trim().is_empty() {
            issues.push(ConfigIssue::error("gemini.base_url", "gemini.base_url is empty"));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_wins() {
        let config = FileGeminiConfig {
            api_key: Some("direct".to_string()),
            ..Default::default()
        };
        let key = config.resolve_api_key_with(|_| Some("from-env".to_string()));
        assert_eq!(key.as_deref(), Some("direct"));
    }

    #[test]
    fn test_key_from_named_variable() {
        let config = FileGeminiConfig {
            api_key_env: "CUSTOM_KEY".to_string(),
            ..Default::default()
        };
        let key = config.resolve_api_key_with(|name| {
            (name == "CUSTOM_KEY").then(|| " abc123 ".to_string())
        });
        assert_eq!(key.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = FileGeminiConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key_with(|_| None), None);
        assert_eq!(FileGeminiConfig::default().resolve_api_key_with(|_| None), None);
    }

    #[test]
    fn test_parse_model_fallback() {
        let config = FileGeminiConfig {
            model: String::new(),
            ..Default::default()
        };
        let (model, issues) = config.parse_model();
        assert_eq!(model, Model::default());
        assert_eq!(issues.len(), 1);
    }
}
