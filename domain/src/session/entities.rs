//! Session domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// The chronological transcript of one chat session (Entity)
///
/// The sequence only grows. The one mutation allowed on an existing entry
/// is replacing the text of the last message (or a referenced assistant
/// turn) while its response is still being produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Append a user turn and return its index.
    pub fn append_user(&mut self, text: impl Into<String>) -> usize {
        self.messages.push(Message::user(text));
        self.messages.len() - 1
    }

    /// Append an empty assistant turn to be filled by a response.
    pub fn append_assistant_placeholder(&mut self) -> usize {
        self.messages.push(Message::assistant(String::new()));
        self.messages.len() - 1
    }

    /// Replace the text of the most recently appended message.
    pub fn update_last(&mut self, text: impl Into<String>) -> Result<(), DomainError> {
        let last = self
            .messages
            .last_mut()
            .ok_or(DomainError::EmptyConversation)?;
        last.text = text.into();
        Ok(())
    }

    /// Overwrite the referenced message with an error text.
    pub fn mark_failed(
        &mut self,
        index: usize,
        error_text: impl Into<String>,
    ) -> Result<(), DomainError> {
        let message = self
            .messages
            .get_mut(index)
            .ok_or(DomainError::MessageNotFound(index))?;
        message.text = error_text.into();
        Ok(())
    }
}
