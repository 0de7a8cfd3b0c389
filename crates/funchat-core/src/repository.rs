//! Persistent store contract.
//!
//! The session layer only talks to [`ChatRepository`], so the whole-collection
//! implementation in the infrastructure crate can be swapped for an indexed
//! backend without changing callers.

use crate::conversation::Conversation;
use crate::error::Result;
use crate::message::Message;
use crate::user::User;

/// Durable, synchronous access to users, conversations and messages.
///
/// # Implementation Notes
///
/// - Reads are total: a missing or unreadable collection is an empty one.
/// - Every mutating call is durable before it returns.
/// - Mutating calls only fail when the underlying storage fails; absence of
///   data is reported through `Option`/`bool`, never as an error.
pub trait ChatRepository: Send + Sync {
    /// Returns all users, or an empty list if none were stored.
    fn get_users(&self) -> Vec<User>;

    /// Linear lookup over [`ChatRepository::get_users`].
    fn get_user_by_id(&self, id: &str) -> Option<User> {
        self.get_users().into_iter().find(|u| u.id == id)
    }

    /// Inserts `user` unless its id is already taken.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: user inserted
    /// - `Ok(false)`: a user with the same id exists; nothing was written
    fn add_user(&self, user: User) -> Result<bool>;

    /// Conversations containing `user_id`, most recent activity first.
    fn get_conversations_for_user(&self, user_id: &str) -> Vec<Conversation>;

    /// Returns the conversation with exactly this participant set, creating
    /// and persisting it if none exists.
    fn create_conversation(&self, participant_ids: &[String]) -> Result<Conversation>;

    /// Messages of one conversation in chronological order.
    fn get_messages(&self, conversation_id: &str) -> Vec<Message>;

    /// Appends `message` and refreshes the owning conversation's
    /// `last_message`. A message for an unknown conversation is still stored.
    fn add_message(&self, message: &Message) -> Result<()>;
}

/// Sorts conversations by last activity, newest first.
///
/// The sort is stable, so conversations with equal activity keep their
/// stored order.
pub fn sort_by_recent_activity(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
}

/// Sorts messages by timestamp, oldest first (stable).
pub fn sort_chronologically(messages: &mut [Message]) {
    messages.sort_by_key(|m| m.timestamp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageStatus;

    fn message_at(conversation_id: &str, id: &str, timestamp: i64) -> Message {
        Message {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: "u1".to_string(),
            text: id.to_string(),
            timestamp,
            status: MessageStatus::Sent,
        }
    }

    #[test]
    fn test_recent_activity_puts_empty_conversations_last() {
        let mut empty = Conversation::new(vec!["u1".into(), "bot-1".into()]);
        empty.id = "empty".into();
        let mut old = Conversation::new(vec!["u1".into(), "bot-2".into()]);
        old.id = "old".into();
        old.last_message = Some(message_at("old", "m1", 10));
        let mut new = Conversation::new(vec!["u1".into(), "bot-3".into()]);
        new.id = "new".into();
        new.last_message = Some(message_at("new", "m2", 20));

        let mut list = vec![empty, old, new];
        sort_by_recent_activity(&mut list);

        let order: Vec<&str> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "empty"]);
    }

    #[test]
    fn test_chronological_sort_is_stable_for_ties() {
        let mut list = vec![
            message_at("c", "b", 5),
            message_at("c", "a", 1),
            message_at("c", "c", 5),
        ];
        sort_chronologically(&mut list);

        let order: Vec<&str> = list.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
