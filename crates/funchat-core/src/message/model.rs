//! Message domain model.

use super::clock::MessageClock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery status recorded on a message.
///
/// Only the creation-time value is ever written; nothing advances it
/// afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Sent,
    Delivered,
    Read,
}

/// A single message in a conversation.
///
/// Serialized with the field names of the persisted layout
/// (`conversationId`, `senderId`). Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier (`msg-<uuid>`)
    pub id: String,
    /// Conversation this message belongs to
    pub conversation_id: String,
    /// Author of the message; not checked against the user collection
    pub sender_id: String,
    /// Message body
    pub text: String,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Delivery status at creation time
    pub status: MessageStatus,
}

impl Message {
    /// Creates a message with a fresh id, timestamped by `clock`.
    pub fn new(
        conversation_id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
        status: MessageStatus,
        clock: &MessageClock,
    ) -> Self {
        Self {
            id: format!("msg-{}", Uuid::new_v4()),
            conversation_id: conversation_id.into(),
            sender_id: sender_id.into(),
            text: text.into(),
            timestamp: clock.now_millis(),
            status,
        }
    }

    /// Whether `user_id` wrote this message.
    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let clock = MessageClock::new();
        let message = Message::new("conv-1", "u1", "hello", MessageStatus::Delivered, &clock);

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["conversationId"], "conv-1");
        assert_eq!(json["senderId"], "u1");
        assert_eq!(json["status"], "delivered");
        assert!(json["id"].as_str().unwrap().starts_with("msg-"));
    }

    #[test]
    fn test_deserialize_persisted_layout() {
        let raw = r#"{"id":"msg-1","conversationId":"c","senderId":"bot-1","text":"hi","timestamp":1700000000000,"status":"read"}"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(message.status, MessageStatus::Read);
        assert!(message.is_from("bot-1"));
    }
}
