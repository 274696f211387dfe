//! Error types for the Gemini adapter

use gemchat_application::GatewayError;
use thiserror::Error;

/// Result type alias for Gemini operations
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Errors that can occur when talking to the Gemini API
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("API key not set (looked for environment variable {env_var})")]
    MissingApiKey { env_var: String },

    #[error("API key is empty")]
    EmptyApiKey,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {error}\nRaw response: {raw}")]
    Parse { error: String, raw: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response blocked: {0}")]
    Blocked(String),
}

impl From<GeminiError> for GatewayError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey { .. } | GeminiError::EmptyApiKey => {
                GatewayError::MissingCredential
            }
            GeminiError::Http(e) if e.is_connect() || e.is_timeout() => {
                GatewayError::ConnectionError(e.to_string())
            }
            GeminiError::Http(e) => GatewayError::RequestFailed(e.to_string()),
            GeminiError::Parse { error, .. } => GatewayError::MalformedResponse(error),
            GeminiError::Api { status, message } => GatewayError::ApiError { status, message },
            GeminiError::Blocked(reason) => GatewayError::Blocked(reason),
            GeminiError::ClientBuild(message) => GatewayError::Other(message),
        }
    }
}
