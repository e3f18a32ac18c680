//! Bounded per-user chat history.
//!
//! The stored log keeps at most [`RETENTION_CAP`] messages; the AI only
//! ever sees the last [`CONTEXT_WINDOW`] of them. Messages are dropped from
//! the head, never reordered or edited.

use serde::{Deserialize, Serialize};

/// Maximum number of messages kept in storage.
pub const RETENTION_CAP: usize = 20;

/// Maximum number of stored messages sent to the AI as history.
pub const CONTEXT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered chat history of one user.
///
/// Deserializing goes through [`ConversationLog::from_messages`], so a log
/// read from any source holds at most [`RETENTION_CAP`] messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ChatMessage>", into = "Vec<ChatMessage>")]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
}

impl From<Vec<ChatMessage>> for ConversationLog {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self::from_messages(messages)
    }
}

impl From<ConversationLog> for Vec<ChatMessage> {
    fn from(log: ConversationLog) -> Self {
        log.messages
    }
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from stored messages, keeping only the newest
    /// [`RETENTION_CAP`].
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        let mut log = Self { messages };
        log.truncate_head();
        log
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn truncate_head(&mut self) {
        if self.messages.len() > RETENTION_CAP {
            let excess = self.messages.len() - RETENTION_CAP;
            self.messages.drain(..excess);
        }
    }
}

/// Append one user/assistant exchange, then drop the oldest messages beyond
/// [`RETENTION_CAP`].
pub fn append_turn(
    mut log: ConversationLog,
    user_text: impl Into<String>,
    assistant_text: impl Into<String>,
) -> ConversationLog {
    log.messages.push(ChatMessage::user(user_text));
    log.messages.push(ChatMessage::assistant(assistant_text));
    log.truncate_head();
    log
}

/// The last [`CONTEXT_WINDOW`] messages of `log`.
pub fn context_window(log: &ConversationLog) -> &[ChatMessage] {
    let start = log.messages.len().saturating_sub(CONTEXT_WINDOW);
    &log.messages[start..]
}
