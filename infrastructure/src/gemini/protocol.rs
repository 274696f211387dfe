//! Generative Language API wire types.
//!
//! Only the fields the client reads or writes are modelled; unknown
//! fields in responses are ignored.

use super::error::{GeminiError, Result};
use serde::{Deserialize, Serialize};

/// Finish reasons that mean the candidate's text was withheld.
const BLOCKING_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Body of `generateContent` and `streamGenerateContent` requests
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Request carrying a single user turn.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A full response, or one chunk of a streamed response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    /// Present when the server reports a failure inside a stream.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Why the prompt or the first candidate was blocked, if it was.
    pub fn block_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Some(reason);
        }
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .filter(|reason| BLOCKING_FINISH_REASONS.contains(reason))
            .map(str::to_owned)
    }

    /// Text of this response, or an error when it was blocked or
    /// carries an API error.
    pub fn into_text(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(GeminiError::Api {
                status: error.code.unwrap_or_default(),
                message: error.summary(),
            });
        }
        match self.block_reason() {
            Some(reason) => Err(GeminiError::Blocked(reason)),
            None => Ok(self.text()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

/// The `error` object of an API error response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ApiErrorBody {
    fn summary(&self) -> String {
        match &self.status {
            Some(status) => format!("{} ({})", collapse(&self.message), status),
            None => collapse(&self.message),
        }
    }
}

/// Human-readable summary of an error response body.
///
/// Uses the API's `error.message` (with its status code name) when the
/// body is the standard error envelope, otherwise the trimmed body.
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    match serde_json::from_str::<ErrorEnvelope>(trimmed) {
        Ok(envelope) => envelope.error.summary(),
        Err(_) => collapse(trimmed),
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_single_user_turn() {
        let request = GenerateContentRequest::from_prompt("hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })
        );
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let raw = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Hi"}, {"text": " there"}]},
                 "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 1}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.block_reason(), None);
        assert_eq!(response.into_text().unwrap(), "Hi there");
    }

    #[test]
    fn response_without_candidates_has_empty_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), "");
    }

    #[test]
    fn prompt_feedback_block_is_an_error() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(GeminiError::Blocked(reason)) if reason == "SAFETY"
        ));
    }

    #[test]
    fn blocking_finish_reason_is_an_error() {
        let raw = r#"{"candidates": [{"finishReason": "RECITATION"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.block_reason().as_deref(), Some("RECITATION"));

        let raw = r#"{"candidates": [{"content": {"parts": [{"text": "end"}]}, "finishReason": "MAX_TOKENS"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text().unwrap(), "end");
    }

    #[test]
    fn in_stream_error_object_is_an_api_error() {
        let raw = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        match response.into_text() {
            Err(GeminiError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "The model is overloaded. (UNAVAILABLE)");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn error_body_summary_prefers_api_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.\n Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(
            summarize_error_body(body),
            "API key not valid. Please pass a valid API key. (INVALID_ARGUMENT)"
        );
        assert_eq!(
            summarize_error_body(r#"{"error": {"message": "quota"}}"#),
            "quota"
        );
        assert_eq!(summarize_error_body("  upstream timeout \n"), "upstream timeout");
        assert_eq!(summarize_error_body(""), "<empty body>");
    }
}
