//! Gemini adapter
//!
//! Talks to the Generative Language REST API:
//!
//! - `models/{model}:generateContent` for single-shot responses
//! - `models/{model}:streamGenerateContent?alt=sse` for streamed responses
//!
//! [`gateway::GeminiGateway`] implements the application's `LlmGateway`
//! port on top of these two calls.

pub mod error;
pub mod gateway;
pub mod protocol;
pub mod sse;
