//! Conversation state store shared by the submission use case and renderers.

mod store;

pub use store::{ChatSnapshot, ChatStore, LoadingGuard};
