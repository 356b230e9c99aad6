//! Conversation history, keyed by session id

use crate::agent::types::{Message, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// One exchanged message as kept in history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// Who said it
    pub role: Role,
    /// What was said
    pub content: String,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Convert into a wire message for the next request
    pub fn to_message(&self) -> Message {
        match self.role {
            Role::System => Message::system(&self.content),
            Role::User => Message::user(&self.content),
            Role::Assistant | Role::Tool => Message::assistant(&self.content),
        }
    }
}

/// A conversation session
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: Uuid,
    /// Session the history is attached to
    pub session_id: String,
    /// Model answering in this conversation
    pub model: String,
    /// Messages in the conversation
    pub entries: Vec<HistoryEntry>,
    /// When the conversation started
    pub created_at: DateTime<Utc>,
    /// When the conversation was last updated
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new, empty conversation
    pub fn new(session_id: impl Into<String>, model: impl Into<String>) -> Self {
        let now = Utc::now();
        Conversation {
            id: Uuid::new_v4(),
            session_id: session_id.into(),
            model: model.into(),
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn push(&mut self, role: Role, content: impl Into<String>) {
        let now = Utc::now();
        self.entries.push(HistoryEntry {
            role,
            content: content.into(),
            timestamp: now,
        });
        self.updated_at = now;
    }

    /// Add a user message
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.push(Role::User, content);
    }

    /// Add an assistant message
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content);
    }

    /// Record one completed exchange, user first
    pub fn record_exchange(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.add_user_message(input);
        self.add_assistant_message(output);
    }

    /// History as wire messages, oldest first
    pub fn messages(&self) -> Vec<Message> {
        self.entries.iter().map(HistoryEntry::to_message).collect()
    }

    /// Get message count
    pub fn message_count(&self) -> usize {
        self.entries.len()
    }
}

/// In-memory history for every session the process has seen.
///
/// Nothing is persisted; the store lives as long as the process. New
/// conversations are tagged with the store's model.
#[derive(Debug)]
pub struct SessionStore {
    model: String,
    conversations: HashMap<String, Conversation>,
}

impl SessionStore {
    /// Create an empty store for `model`
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            conversations: HashMap::new(),
        }
    }

    /// Get or create the conversation for a session
    pub fn get_or_create(&mut self, session_id: &str) -> &mut Conversation {
        let model = &self.model;
        self.conversations
            .entry(session_id.to_string())
            .or_insert_with(|| Conversation::new(session_id, model.as_str()))
    }

    /// Get a conversation by session id
    pub fn get(&self, session_id: &str) -> Option<&Conversation> {
        self.conversations.get(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_creation() {
        let conv = Conversation::new("test-session", "gpt-3.5-turbo-0125");
        assert_eq!(conv.session_id, "test-session");
        assert_eq!(conv.model, "gpt-3.5-turbo-0125");
        assert_eq!(conv.message_count(), 0);
    }

    #[test]
    fn test_record_exchange_keeps_order() {
        let mut conv = Conversation::new("test-session", "gpt-3.5-turbo-0125");
        conv.record_exchange("Hello", "Hi there!");
        conv.record_exchange("Weather?", "Sunny.");

        assert_eq!(conv.message_count(), 4);
        let roles: Vec<Role> = conv.entries.iter().map(|e| e.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );

        let messages = conv.messages();
        assert_eq!(messages[2], Message::user("Weather?"));
        assert_eq!(messages[3], Message::assistant("Sunny."));
    }

    #[test]
    fn test_session_store_creates_once() {
        let mut store = SessionStore::new("gpt-4o-mini");
        let id = store.get_or_create("test-session").id;
        store.get_or_create("test-session").add_user_message("Hello");
        store.get_or_create("test-session").add_assistant_message("Hi");

        let conv = store.get("test-session").unwrap();
        assert_eq!(conv.id, id);
        assert_eq!(conv.model, "gpt-4o-mini");
        assert_eq!(conv.message_count(), 2);
        assert!(store.get("other").is_none());
    }
}
