//! Observable chat state.
//!
//! [`ChatStore`] owns the [`Conversation`] together with the loading flag and
//! the session-level error. Every mutation takes the lock, applies the
//! change, releases the lock and then notifies each registered
//! [`ConversationObserver`] with a [`ChatSnapshot`] before returning.
//! Observers therefore see every intermediate state, in order, and may call
//! back into the store without deadlocking.

use crate::ports::conversation_observer::ConversationObserver;
use gemchat_domain::{Conversation, DomainError, Message};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::trace;

/// Point-in-time copy of the chat state handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ChatSnapshot {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Whether the entry at `index` should be drawn as an in-progress
    /// indicator instead of its (empty) text.
    ///
    /// Display rule only: the entry is the last one, a submission is in
    /// flight and no text has arrived yet.
    pub fn shows_pending_indicator(&self, index: usize) -> bool {
        self.loading
            && index + 1 == self.messages.len()
            && self.messages[index].is_assistant()
            && self.messages[index].text.is_empty()
    }
}

#[derive(Default)]
struct ChatState {
    conversation: Conversation,
    loading: bool,
    error: Option<String>,
    /// Index of the assistant turn whose response is still open
    streaming: Option<usize>,
}

impl ChatState {
    /// Only the open assistant turn, while it is the last entry, may change.
    fn ensure_open(&self, index: usize) -> Result<(), DomainError> {
        if self.streaming == Some(index) && index + 1 == self.conversation.len() {
            Ok(())
        } else {
            Err(DomainError::MessageClosed(index))
        }
    }

    fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            messages: self.conversation.messages().to_vec(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

/// Thread-safe conversation state store
pub struct ChatStore {
    state: Mutex<ChatState>,
    observers: RwLock<Vec<Arc<dyn ConversationObserver>>>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChatState::default()),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer for all subsequent changes.
    pub fn subscribe(&self, observer: Arc<dyn ConversationObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.lock().snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().conversation.is_empty()
    }

    /// Append a user turn; returns its index.
    pub fn append_user(&self, text: impl Into<String>) -> usize {
        let text = text.into();
        self.apply(|state| {
            state.streaming = None;
            state.conversation.append_user(text)
        })
    }

    /// Append an empty assistant turn; returns its index.
    pub fn append_assistant_placeholder(&self) -> usize {
        self.apply(|state| {
            let index = state.conversation.append_assistant_placeholder();
            state.streaming = Some(index);
            index
        })
    }

    /// Replace the text of the last message.
    ///
    /// Fails with [`DomainError::MessageClosed`] unless the last message is
    /// the assistant turn whose response is still open.
    pub fn update_last(&self, text: impl Into<String>) -> Result<(), DomainError> {
        let text = text.into();
        self.try_apply(|state| {
            let last = state
                .conversation
                .len()
                .checked_sub(1)
                .ok_or(DomainError::EmptyConversation)?;
            state.ensure_open(last)?;
            state.conversation.update_last(text)
        })
    }

    /// Overwrite the open assistant turn at `index` with an error text and
    /// close it.
    pub fn mark_failed(
        &self,
        index: usize,
        error_text: impl Into<String>,
    ) -> Result<(), DomainError> {
        let error_text = error_text.into();
        self.try_apply(|state| {
            if state.conversation.get(index).is_none() {
                return Err(DomainError::MessageNotFound(index));
            }
            state.ensure_open(index)?;
            state.conversation.mark_failed(index, error_text)?;
            state.streaming = None;
            Ok(())
        })
    }

    /// Set the session-level error indicator.
    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.apply(|state| state.error = Some(message));
    }

    /// Admission control for a new submission.
    ///
    /// Returns `None` while another submission holds the loading flag.
    /// Otherwise sets loading, clears the previous session error and hands
    /// back a guard that clears loading when dropped.
    pub fn try_begin_submission(&self) -> Option<LoadingGuard<'_>> {
        let snapshot = {
            let mut state = self.lock();
            if state.loading {
                return None;
            }
            state.loading = true;
            state.error = None;
            state.snapshot()
        };
        self.notify(&snapshot);
        Some(LoadingGuard { store: self })
    }

    fn finish_submission(&self) {
        self.apply(|state| {
            state.loading = false;
            state.streaming = None;
        });
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` under the lock and notify observers once the lock
    /// is released.
    fn apply<R>(&self, change: impl FnOnce(&mut ChatState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.lock();
            let result = change(&mut state);
            (result, state.snapshot())
        };
        self.notify(&snapshot);
        result
    }

    /// Like [`apply`](Self::apply), but a failed change leaves the state
    /// untouched and notifies nobody.
    fn try_apply<R>(
        &self,
        change: impl FnOnce(&mut ChatState) -> Result<R, DomainError>,
    ) -> Result<R, DomainError> {
        let (result, snapshot) = {
            let mut state = self.lock();
            let result = change(&mut state)?;
            (result, state.snapshot())
        };
        self.notify(&snapshot);
        Ok(result)
    }

    fn notify(&self, snapshot: &ChatSnapshot) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        trace!(
            observers = observers.len(),
            messages = snapshot.len(),
            "Notifying chat observers"
        );
        for observer in observers {
            observer.on_change(snapshot);
        }
    }
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped ownership of the loading flag.
///
/// Acquired through [`ChatStore::try_begin_submission`]; dropping it clears
/// the flag exactly once, whichever way the submission exits.
#[must_use = "dropping the guard immediately clears the loading flag"]
pub struct LoadingGuard<'a> {
    store: &'a ChatStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.finish_submission();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingObserver;

    #[test]
    fn appends_notify_observers_synchronously() {
        let store = ChatStore::new();
        let observer = RecordingObserver::new();
        store.subscribe(observer.clone());

        assert_eq!(store.append_user("hello"), 0);
        assert_eq!(store.append_assistant_placeholder(), 1);

        let seen = observer.snapshots();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].messages, vec![Message::user("hello")]);
        assert_eq!(
            seen[1].messages,
            vec![Message::user("hello"), Message::assistant("")]
        );
    }

    #[test]
    fn every_update_is_observed_in_order() {
        let store = ChatStore::new();
        store.append_user("q");
        store.append_assistant_placeholder();

        let observer = RecordingObserver::new();
        store.subscribe(observer.clone());

        for text in ["a", "ab", "abc"] {
            store.update_last(text).unwrap();
        }

        let texts: Vec<String> = observer
            .snapshots()
            .iter()
            .map(|s| s.last().unwrap().text.clone())
            .collect();
        assert_eq!(texts, vec!["a", "ab", "abc"]);
    }

    #[test]
    fn update_last_on_empty_store_fails_without_notifying() {
        let store = ChatStore::new();
        let observer = RecordingObserver::new();
        store.subscribe(observer.clone());

        assert_eq!(store.update_last("x"), Err(DomainError::EmptyConversation));
        assert!(observer.snapshots().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn mark_failed_replaces_target_text() {
        let store = ChatStore::new();
        store.append_user("x");
        let target = store.append_assistant_placeholder();
        store.update_last("par").unwrap();

        store.mark_failed(target, "failed").unwrap();
        assert_eq!(store.snapshot().messages[target].text, "failed");
        assert_eq!(
            store.mark_failed(42, "failed"),
            Err(DomainError::MessageNotFound(42))
        );
    }

    #[test]
    fn settled_turns_are_closed() {
        let store = ChatStore::new();
        let guard = store.try_begin_submission().unwrap();
        store.append_user("hello");
        let target = store.append_assistant_placeholder();
        store.update_last("Hi there").unwrap();
        drop(guard);

        let observer = RecordingObserver::new();
        store.subscribe(observer.clone());

        assert_eq!(
            store.update_last("tampered"),
            Err(DomainError::MessageClosed(target))
        );
        assert_eq!(
            store.mark_failed(0, "overwritten"),
            Err(DomainError::MessageClosed(0))
        );
        assert_eq!(
            store.mark_failed(target, "overwritten"),
            Err(DomainError::MessageClosed(target))
        );
        assert_eq!(
            store.snapshot().messages,
            vec![Message::user("hello"), Message::assistant("Hi there")]
        );
        assert!(observer.snapshots().is_empty());
    }

    #[test]
    fn failed_turn_cannot_be_updated_again() {
        let store = ChatStore::new();
        store.append_user("x");
        let target = store.append_assistant_placeholder();
        store.mark_failed(target, "failed").unwrap();

        assert_eq!(store.update_last("late"), Err(DomainError::MessageClosed(target)));
        assert_eq!(
            store.mark_failed(target, "again"),
            Err(DomainError::MessageClosed(target))
        );
        assert_eq!(store.snapshot().messages[target].text, "failed");
    }

    #[test]
    fn user_turn_is_never_writable() {
        let store = ChatStore::new();
        store.append_user("only");
        assert_eq!(store.update_last("changed"), Err(DomainError::MessageClosed(0)));
        assert_eq!(store.mark_failed(0, "changed"), Err(DomainError::MessageClosed(0)));
    }

    #[test]
    fn admission_rejects_while_loading_and_guard_releases() {
        let store = ChatStore::new();
        store.set_error("old failure");

        let guard = store.try_begin_submission().expect("first admission");
        assert!(store.is_loading());
        assert_eq!(store.error(), None);
        assert!(store.try_begin_submission().is_none());

        drop(guard);
        assert!(!store.is_loading());
        assert!(store.try_begin_submission().is_some());
        assert!(!store.is_loading());
    }

    #[test]
    fn observers_may_read_the_store_during_notification() {
        struct Reentrant {
            store: Arc<ChatStore>,
            lengths: Mutex<Vec<usize>>,
        }
        impl ConversationObserver for Reentrant {
            fn on_change(&self, _snapshot: &ChatSnapshot) {
                self.lengths.lock().unwrap().push(self.store.len());
            }
        }

        let store = Arc::new(ChatStore::new());
        let observer = Arc::new(Reentrant {
            store: store.clone(),
            lengths: Mutex::new(Vec::new()),
        });
        store.subscribe(observer.clone());

        store.append_user("a");
        store.append_assistant_placeholder();
        assert_eq!(*observer.lengths.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn pending_indicator_rule() {
        let mut snapshot = ChatSnapshot {
            messages: vec![Message::user("q"), Message::assistant("")],
            loading: true,
            error: None,
        };
        assert!(snapshot.shows_pending_indicator(1));
        assert!(!snapshot.shows_pending_indicator(0));

        snapshot.loading = false;
        assert!(!snapshot.shows_pending_indicator(1));

        snapshot.loading = true;
        snapshot.messages[1].text = "H".into();
        assert!(!snapshot.shows_pending_indicator(1));
    }
}
