//! Conversation observer port
//!
//! Observers are notified synchronously after every change to the
//! [`ChatStore`](crate::state::ChatStore), once per fragment while a
//! response streams in. Renderers implement this to redraw and scroll
//! progressively; tests implement it to record intermediate states.

use crate::state::ChatSnapshot;

/// Callback for chat state changes
pub trait ConversationObserver: Send + Sync {
    /// Called with the state as it is right after a mutation.
    fn on_change(&self, snapshot: &ChatSnapshot);
}
