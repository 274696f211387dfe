//! Gemini implementation of the [`LlmGateway`] port.

use super::error::{GeminiError, Result};
use super::protocol::{GenerateContentRequest, GenerateContentResponse, summarize_error_body};
use super::sse::SseDecoder;
use crate::config::FileGeminiConfig;
use async_trait::async_trait;
use futures::StreamExt;
use gemchat_application::{GatewayError, LlmGateway, StreamHandle};
use gemchat_domain::{Model, StreamEvent, core::string::truncate};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Buffered events between the body reader task and the consumer
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Maximum raw body kept in parse errors
const RAW_PREVIEW_LEN: usize = 500;

/// Everything needed to construct a [`GeminiGateway`]
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: Model,
    pub connect_timeout: Option<Duration>,
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>, model: Model) -> Self {
        let defaults = FileGeminiConfig::default();
        Self {
            api_key: api_key.into(),
            base_url: defaults.base_url,
            model,
            connect_timeout: Some(Duration::from_secs(defaults.timeout_secs)),
        }
    }

    /// Build settings from the `[gemini]` config section.
    ///
    /// `model` is passed separately so command-line overrides win over
    /// the file value.
    pub fn from_config(config: &FileGeminiConfig, model: Model) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| GeminiError::MissingApiKey {
                env_var: config.api_key_env.clone(),
            })?;
        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            model,
            connect_timeout: (config.timeout_secs > 0)
                .then(|| Duration::from_secs(config.timeout_secs)),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Gateway talking to the Gemini REST API
pub struct GeminiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: Model,
}

impl GeminiGateway {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(GeminiError::EmptyApiKey);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GeminiError::ClientBuild(e.to_string()))?;

        info!("Gemini gateway ready for model {}", settings.model);

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.trim().to_string(),
            model: settings.model,
        })
    }

    /// URL of a model method, e.g. `generateContent`.
    pub fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method)
    }

    async fn post(&self, url: &str, prompt: &str) -> Result<reqwest::Response> {
        let body = GenerateContentRequest::from_prompt(prompt);
        debug!("POST {} ({} prompt bytes)", url, prompt.len());

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = summarize_error_body(&text);
            warn!("Gemini returned {}: {}", status, message);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Single request, whole response text.
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint("generateContent");
        let raw = self.post(&url, prompt).await?.text().await?;

        let response: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|e| GeminiError::Parse {
                error: e.to_string(),
                raw: truncate(&raw, RAW_PREVIEW_LEN),
            })?;
        response.into_text()
    }

    /// Open a streamed response.
    ///
    /// Fails directly when the request cannot be sent or the server answers
    /// with an error status. Once the body starts flowing, problems arrive
    /// as a `StreamEvent::Error` on the handle.
    pub async fn stream_content(&self, prompt: &str) -> Result<StreamHandle> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.post(&url, prompt).await?;

        let (tx, handle) = StreamHandle::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(pump_events(response, tx));
        Ok(handle)
    }
}

/// Read the SSE body and forward each chunk's text as a `Delta`.
async fn pump_events(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    let mut chunks = 0usize;

    while let Some(bytes) = body.next().await {
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Stream interrupted after {} chunks: {}", chunks, e);
                let _ = tx
                    .send(StreamEvent::Error(format!("Stream interrupted: {e}")))
                    .await;
                return;
            }
        };

        for payload in decoder.push(&bytes) {
            chunks += 1;
            if !forward_payload(&payload, &tx).await {
                return;
            }
        }

        if let Err(e) = decoder.check_limit() {
            warn!("Dropping stream after {} chunks: {}", chunks, e);
            let _ = tx.send(StreamEvent::Error(e.to_string())).await;
            return;
        }
    }

    if let Some(payload) = decoder.finish()
        && !forward_payload(&payload, &tx).await
    {
        return;
    }

    debug!("Stream finished after {} chunks", chunks);
    let _ = tx.send(StreamEvent::Completed).await;
}

/// Returns `false` when the stream must stop, either because a terminal
/// error was sent or the receiver has gone away.
async fn forward_payload(payload: &str, tx: &mpsc::Sender<StreamEvent>) -> bool {
    let event = match serde_json::from_str::<GenerateContentResponse>(payload) {
        Ok(chunk) => match chunk.into_text() {
            Ok(text) if text.is_empty() => return true,
            Ok(text) => StreamEvent::Delta(text),
            Err(e) => StreamEvent::Error(e.to_string()),
        },
        Err(e) => {
            warn!("Malformed stream chunk: {}", truncate(payload, RAW_PREVIEW_LEN));
            StreamEvent::Error(format!("Malformed stream chunk: {e}"))
        }
    };

    let terminal = event.is_terminal();
    tx.send(event).await.is_ok() && !terminal
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, GatewayError> {
        Ok(self.generate_content(prompt).await?)
    }

    async fn generate_stream(&self, prompt: &str) -> std::result::Result<StreamHandle, GatewayError> {
        Ok(self.stream_content(prompt).await?)
    }
}
