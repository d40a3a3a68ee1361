//! Conversation message types.

use crate::card::Card;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the assistant.
    Assistant,
}

/// A single transcript entry.
///
/// Messages are immutable once rendered, with one exception: a placeholder
/// assistant message may have its content and cards replaced in place
/// (same id, same position) when the exchange it stands for completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    /// Timestamp when the message was created (ISO 8601 format).
    pub created_at: String,
}

/// Generates a message id of the form `<prefix>_<uuid>`.
pub fn new_message_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

impl ChatMessage {
    pub fn new(id: String, role: MessageRole, content: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            cards,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(new_message_id("user"), MessageRole::User, content, Vec::new())
    }

    pub fn assistant(content: impl Into<String>, cards: Vec<Card>) -> Self {
        Self::new(new_message_id("assistant"), MessageRole::Assistant, content, cards)
    }

    /// An assistant message reporting a failed exchange.
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self::new(
            new_message_id("assistant_err"),
            MessageRole::Assistant,
            content,
            Vec::new(),
        )
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_prefixed_and_unique() {
        let a = ChatMessage::user("hi");
        let b = ChatMessage::user("hi");
        assert!(a.id.starts_with("user_"));
        assert_ne!(a.id, b.id);
        assert!(ChatMessage::assistant_error("x").id.starts_with("assistant_err_"));
        assert!(new_message_id("analyzing").starts_with("analyzing_"));
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
