//! The ordered message sequence of a conversation.

use super::message::ChatMessage;
use crate::card::Card;
use serde::Serialize;

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A message with the same id existed and was replaced at its index.
    Replaced(usize),
    /// No such id; the message was appended at this index.
    Appended(usize),
}

/// Append-only message list with a single in-place replacement path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
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

    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn push(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Replaces the message with the same id in place, or appends it.
    ///
    /// On replacement the existing id, role, position and creation time are
    /// kept; only content and cards change. Applying the same upsert twice
    /// leaves the transcript as after the first.
    pub fn upsert(&mut self, message: ChatMessage) -> Upsert {
        match self.messages.iter().position(|m| m.id == message.id) {
            Some(index) => {
                let slot = &mut self.messages[index];
                slot.content = message.content;
                slot.cards = message.cards;
                Upsert::Replaced(index)
            }
            None => Upsert::Appended(self.push(message)),
        }
    }

    /// Resolves a pending placeholder if `placeholder_id` is set, otherwise
    /// appends `fallback`.
    pub fn resolve(
        &mut self,
        placeholder_id: Option<&str>,
        content: String,
        cards: Vec<Card>,
        fallback: ChatMessage,
    ) -> Upsert {
        let message = match placeholder_id {
            Some(id) => ChatMessage {
                id: id.to_string(),
                content,
                cards,
                ..fallback
            },
            None => ChatMessage {
                content,
                cards,
                ..fallback
            },
        };
        self.upsert(message)
    }
}
