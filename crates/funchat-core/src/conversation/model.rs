//! Conversation domain model.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conversation between a fixed set of participants.
///
/// `last_message` is a denormalized copy of the most recent message written
/// to the conversation. The store keeps it in sync on every message write;
/// conversations without one sort as if their last activity was `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation identifier (`conv-<uuid>`)
    pub id: String,
    /// Participant user ids, normally two
    pub participant_ids: Vec<String>,
    /// Most recent message written to this conversation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
}

impl Conversation {
    /// Creates an empty conversation with a freshly generated id.
    pub fn new(participant_ids: Vec<String>) -> Self {
        Self {
            id: format!("conv-{}", Uuid::new_v4()),
            participant_ids,
            last_message: None,
        }
    }

    /// Order-independent participant comparison.
    ///
    /// Both sides must hold the same ids with the same multiplicity, so
    /// `[u1, u1]` and `[u1, bot-1]` are different sets.
    pub fn has_participant_set(&self, ids: &[String]) -> bool {
        if self.participant_ids.len() != ids.len() {
            return false;
        }
        let mut stored: Vec<&str> = self.participant_ids.iter().map(String::as_str).collect();
        let mut requested: Vec<&str> = ids.iter().map(String::as_str).collect();
        stored.sort_unstable();
        requested.sort_unstable();
        stored == requested
    }

    pub fn includes(&self, user_id: &str) -> bool {
        self.participant_ids.iter().any(|p| p == user_id)
    }

    /// The first participant that is not `user_id`.
    pub fn contact_for(&self, user_id: &str) -> Option<&str> {
        self.participant_ids
            .iter()
            .find(|p| p.as_str() != user_id)
            .map(String::as_str)
    }

    /// Timestamp used for list ordering.
    pub fn last_activity(&self) -> i64 {
        self.last_message.as_ref().map_or(0, |m| m.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_participant_set_ignores_order() {
        let conversation = Conversation::new(ids(&["u1", "bot-1"]));
        assert!(conversation.has_participant_set(&ids(&["bot-1", "u1"])));
        assert!(!conversation.has_participant_set(&ids(&["u1"])));
        assert!(!conversation.has_participant_set(&ids(&["u1", "bot-2"])));
    }

    #[test]
    fn test_participant_set_respects_duplicates() {
        let self_chat = Conversation::new(ids(&["u1", "u1"]));
        assert!(self_chat.has_participant_set(&ids(&["u1", "u1"])));
        assert!(!self_chat.has_participant_set(&ids(&["u1", "bot-1"])));

        let pair = Conversation::new(ids(&["u1", "bot-1"]));
        assert!(!pair.has_participant_set(&ids(&["u1", "u1"])));
    }

    #[test]
    fn test_contact_for() {
        let conversation = Conversation::new(ids(&["u1", "bot-1"]));
        assert_eq!(conversation.contact_for("u1"), Some("bot-1"));
        assert_eq!(conversation.contact_for("bot-1"), Some("u1"));
    }

    #[test]
    fn test_last_message_omitted_when_absent() {
        let conversation = Conversation::new(ids(&["u1", "bot-1"]));
        let json = serde_json::to_value(&conversation).unwrap();
        assert!(json.get("lastMessage").is_none());
        assert_eq!(json["participantIds"][1], "bot-1");
        assert_eq!(conversation.last_activity(), 0);
    }
}
