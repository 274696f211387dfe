//! Chat session domain.
//!
//! - [`entities::Conversation`]: the ordered, append-only transcript
//! - [`entities::Message`]: a single user or assistant turn
//! - [`stream::StreamSession`]: accumulation state of one in-flight response
//! - [`stream::StreamEvent`]: one item pulled from a response stream

pub mod entities;
pub mod stream;

/// Text that replaces an assistant turn whose response could not be obtained.
pub const RESPONSE_FAILURE_TEXT: &str = "Error: Could not get a response.";

/// Session-level error indicator shown after a failed submission.
pub const SESSION_ERROR_TEXT: &str = "Sorry, something went wrong. Please try again.";
