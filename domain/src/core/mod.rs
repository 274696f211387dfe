//! Core domain concepts shared across the conversation subdomain.
//!
//! - [`model::Model`]: the generative model a chat session talks to
//! - [`prompt::Prompt`]: a validated, non-empty prompt
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod prompt;
pub mod string;
