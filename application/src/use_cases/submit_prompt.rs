//! Submit Prompt use case.
//!
//! Drives one request/response cycle against the model service and
//! projects it onto the [`ChatStore`]:
//!
//! 1. Admission: rejected while another submission is in flight
//! 2. Append the user turn and an empty assistant placeholder
//! 3. Open the model call ([`ResponseMode::Streaming`] or
//!    [`ResponseMode::SingleShot`])
//! 4. Concatenate each fragment in arrival order and replace the
//!    placeholder text after every fragment
//! 5. On failure, overwrite the placeholder with [`RESPONSE_FAILURE_TEXT`]
//!    and raise the session error
//!
//! The loading flag is held by a [`LoadingGuard`](crate::state::LoadingGuard)
//! for the whole cycle and released on every exit path.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::state::ChatStore;
use gemchat_domain::core::string::preview;
use gemchat_domain::{
    DomainError, Prompt, RESPONSE_FAILURE_TEXT, ResponseMode, SESSION_ERROR_TEXT, StreamEvent,
    StreamSession,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

/// Errors that end a submission. Never propagated past the use case;
/// they are reported through [`SubmitOutcome::Failed`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("State error: {0}")]
    State(#[from] DomainError),
}

/// Why a submission was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Another submission is still in flight
    Busy,
    /// Prompt was empty or whitespace only
    EmptyPrompt,
}

/// Result of [`SubmitPromptUseCase::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was appended; state is unchanged.
    Rejected(RejectReason),
    /// The response arrived in full.
    Completed { text: String },
    /// The response failed; the assistant turn holds the failure text.
    Failed { error: SubmitError },
}

/// Use case for submitting a prompt and collecting the model's response.
pub struct SubmitPromptUseCase {
    gateway: Arc<dyn LlmGateway>,
    store: Arc<ChatStore>,
    mode: ResponseMode,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl SubmitPromptUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, store: Arc<ChatStore>) -> Self {
        Self {
            gateway,
            store,
            mode: ResponseMode::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Select how responses are fetched.
    pub fn with_mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn store(&self) -> &Arc<ChatStore> {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<dyn LlmGateway> {
        &self.gateway
    }

    /// Submit a prompt and drive its response to a terminal state.
    ///
    /// Rejected submissions leave the conversation untouched. Every
    /// admitted submission ends with the loading flag cleared.
    pub async fn submit(&self, prompt: &str) -> SubmitOutcome {
        let prompt = match Prompt::new(prompt) {
            Ok(prompt) => prompt,
            Err(_) => {
                debug!("Ignoring empty prompt");
                return self.reject(RejectReason::EmptyPrompt);
            }
        };

        let Some(_loading) = self.store.try_begin_submission() else {
            debug!("Submission in flight, ignoring new prompt");
            return self.reject(RejectReason::Busy);
        };

        self.store.append_user(prompt.content());
        let target = self.store.append_assistant_placeholder();
        let mut session = StreamSession::new(target);

        info!(
            "Submitting prompt to {} ({}): {}",
            self.gateway.model(),
            self.mode,
            preview(prompt.content(), 80)
        );
        self.conversation_logger.log(ConversationEvent::new(
            "prompt_submitted",
            json!({
                "model": self.gateway.model().as_str(),
                "mode": self.mode.as_str(),
                "prompt": prompt.content(),
            }),
        ));

        let result = match self.mode {
            ResponseMode::Streaming => self.consume_stream(&prompt, &mut session).await,
            ResponseMode::SingleShot => self.fetch_once(&prompt, &mut session).await,
        };

        match result {
            Ok(()) => {
                session.complete();
                debug!(
                    "Response complete: {} fragments, {} bytes",
                    session.fragment_count(),
                    session.accumulated().len()
                );
                self.conversation_logger.log(ConversationEvent::new(
                    "response_completed",
                    json!({
                        "fragments": session.fragment_count(),
                        "bytes": session.accumulated().len(),
                        "text": session.accumulated(),
                    }),
                ));
                SubmitOutcome::Completed {
                    text: session.accumulated().to_string(),
                }
            }
            Err(error) => {
                session.fail();
                warn!(
                    "Response failed after {} fragments: {}",
                    session.fragment_count(),
                    error
                );
                if let Err(e) = self.store.mark_failed(session.target(), RESPONSE_FAILURE_TEXT) {
                    error!("Could not mark response as failed: {}", e);
                }
                self.store.set_error(SESSION_ERROR_TEXT);
                self.conversation_logger.log(ConversationEvent::new(
                    "response_failed",
                    json!({
                        "fragments": session.fragment_count(),
                        "partial": session.accumulated(),
                        "error": error.to_string(),
                    }),
                ));
                SubmitOutcome::Failed { error }
            }
        }
    }

    async fn consume_stream(
        &self,
        prompt: &Prompt,
        session: &mut StreamSession,
    ) -> Result<(), SubmitError> {
        let mut stream = self.gateway.generate_stream(prompt.content()).await?;

        while let Some(event) = stream.next_event().await {
            match event {
                StreamEvent::Delta(fragment) => {
                    trace!("Fragment {}: {} bytes", session.fragment_count() + 1, fragment.len());
                    let text = session.push_fragment(&fragment);
                    self.store.update_last(text)?;
                }
                StreamEvent::Completed => break,
                StreamEvent::Error(message) => return Err(SubmitError::Stream(message)),
            }
        }
        Ok(())
    }

    async fn fetch_once(
        &self,
        prompt: &Prompt,
        session: &mut StreamSession,
    ) -> Result<(), SubmitError> {
        let text = self.gateway.generate(prompt.content()).await?;
        let text = session.push_fragment(&text);
        self.store.update_last(text)?;
        Ok(())
    }

    fn reject(&self, reason: RejectReason) -> SubmitOutcome {
        self.conversation_logger.log(ConversationEvent::new(
            "submission_rejected",
            json!({ "reason": format!("{:?}", reason) }),
        ));
        SubmitOutcome::Rejected(reason)
    }
}
