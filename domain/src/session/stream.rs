//! Streaming state for a single model response.
//!
//! [`StreamEvent`] is one item pulled from a response stream, and
//! [`StreamSession`] accumulates the fragments of that stream into the
//! text of a single assistant turn.

/// An event in a streaming model response.
///
/// Bridges the transport-level stream (SSE payloads from the model service)
/// to the application layer. A stream yields any number of `Delta` events
/// and then at most one terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment from the model.
    Delta(String),
    /// The stream ended normally.
    Completed,
    /// The stream failed; no further events follow.
    Error(String),
}

impl StreamEvent {
    /// Returns the fragment text if this is a Delta event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed | StreamEvent::Error(_))
    }
}

/// Termination status of a [`StreamSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Active,
    Completed,
    Failed,
}

/// Accumulator for the response to one submitted prompt.
///
/// Text only grows, by concatenation in arrival order, and only while the
/// session is `Active`.
#[derive(Debug, Clone)]
pub struct StreamSession {
    target: usize,
    accumulated: String,
    fragments: usize,
    status: StreamStatus,
}

impl StreamSession {
    /// Start a session that fills the conversation entry at `target`.
    pub fn new(target: usize) -> Self {
        Self {
            target,
            accumulated: String::new(),
            fragments: 0,
            status: StreamStatus::Active,
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Number of fragments applied so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    pub fn status(&self) -> StreamStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == StreamStatus::Active
    }

    /// Append a fragment and return the accumulated text.
    pub fn push_fragment(&mut self, fragment: &str) -> &str {
        if self.is_active() {
            self.accumulated.push_str(fragment);
            self.fragments += 1;
        }
        &self.accumulated
    }

    pub fn complete(&mut self) {
        if self.is_active() {
            self.status = StreamStatus::Completed;
        }
    }

    pub fn fail(&mut self) {
        if self.is_active() {
            self.status = StreamStatus::Failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_text_returns_content() {
        let event = StreamEvent::Delta("hello".to_string());
        assert_eq!(event.text(), Some("hello"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn completed_and_error_are_terminal() {
        assert!(StreamEvent::Completed.is_terminal());
        assert!(StreamEvent::Error("oops".to_string()).is_terminal());
        assert_eq!(StreamEvent::Error("oops".to_string()).text(), None);
    }

    #[test]
    fn fragments_concatenate_in_order() {
        let mut session = StreamSession::new(1);
        assert_eq!(session.push_fragment("Hi"), "Hi");
        assert_eq!(session.push_fragment(" there"), "Hi there");
        assert_eq!(session.push_fragment(""), "Hi there");
        assert_eq!(session.fragment_count(), 3);
        assert_eq!(session.target(), 1);
        assert_eq!(session.status(), StreamStatus::Active);
    }

    #[test]
    fn fragments_after_termination_are_ignored() {
        let mut session = StreamSession::new(0);
        session.push_fragment("done");
        session.complete();
        assert_eq!(session.push_fragment(" more"), "done");
        assert_eq!(session.status(), StreamStatus::Completed);

        // Terminal status is sticky
        session.fail();
        assert_eq!(session.status(), StreamStatus::Completed);
    }

    #[test]
    fn failed_session_keeps_partial_text() {
        let mut session = StreamSession::new(3);
        session.push_fragment("par");
        session.fail();
        assert_eq!(session.status(), StreamStatus::Failed);
        assert_eq!(session.accumulated(), "par");
        assert!(!session.is_active());
    }
}
