//! LLM Gateway port
//!
//! Defines the interface for communicating with the generative model service.

use async_trait::async_trait;
use gemchat_domain::{Model, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("No API credential configured")]
    MissingCredential,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Prompt blocked: {0}")]
    Blocked(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Handle for pulling streaming events from one model call.
///
/// The sequence is finite and cannot be restarted: once a terminal event
/// has been returned (or the sender side has gone away) every further
/// call to [`next_event`](Self::next_event) yields `None`.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
    finished: bool,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self {
            receiver,
            finished: false,
        }
    }

    /// Create a bounded channel whose receiving end is wrapped in a handle.
    pub fn channel(capacity: usize) -> (mpsc::Sender<StreamEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }

    /// Build an already-filled handle that yields `fragments` then `Completed`.
    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let events: Vec<StreamEvent> = fragments
            .into_iter()
            .map(|f| StreamEvent::Delta(f.into()))
            .chain(std::iter::once(StreamEvent::Completed))
            .collect();
        let (tx, handle) = Self::channel(events.len());
        for event in events {
            // Capacity covers every event, so this cannot fail
            let _ = tx.try_send(event);
        }
        handle
    }

    /// Pull the next event.
    ///
    /// A sender dropped without a terminal event counts as natural
    /// exhaustion and is reported as `Completed`.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }
        match self.receiver.recv().await {
            Some(event) => {
                if event.is_terminal() {
                    self.finished = true;
                    self.receiver.close();
                }
                Some(event)
            }
            None => {
                self.finished = true;
                Some(StreamEvent::Completed)
            }
        }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.next_event().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed => break,
                StreamEvent::Error(e) => return Err(GatewayError::RequestFailed(e)),
            }
        }
        Ok(full_text)
    }
}

/// Gateway for the generative model service
///
/// This port defines how the application layer talks to the model.
/// Implementations (adapters) live in the infrastructure layer; tests
/// substitute scripted stubs.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Model this gateway sends prompts to
    fn model(&self) -> &Model;

    /// Send a prompt and wait for the complete response text
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Send a prompt and get a streaming response.
    ///
    /// Default implementation calls `generate()` and wraps the result in a
    /// single `Delta` followed by `Completed`.
    async fn generate_stream(&self, prompt: &str) -> Result<StreamHandle, GatewayError> {
        let text = self.generate(prompt).await?;
        Ok(StreamHandle::from_fragments([text]))
    }
}
