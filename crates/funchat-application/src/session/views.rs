//! Read models derived from the session projection for list and picker views.

use super::state::SessionState;
use chrono::{Local, TimeZone};
use funchat_core::{ChatError, Conversation, Result, User};

/// Preview shown for a conversation without messages.
pub const NO_MESSAGES_PREVIEW: &str = "No messages yet";

/// One row of the conversation list.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub contact: User,
    /// Last message text, or [`NO_MESSAGES_PREVIEW`]
    pub preview: String,
    /// Local `HH:MM` of the last message
    pub last_message_time: Option<String>,
    /// Whether the current user wrote the last message
    pub sent_by_current_user: bool,
}

impl SessionState {
    /// The other participant of `conversation`, if known to this session.
    pub fn contact_for(&self, conversation: &Conversation) -> Option<&User> {
        let user = self.current_user()?;
        let contact_id = conversation.contact_for(&user.id)?;
        self.get_user_by_id(contact_id)
    }

    /// Rows for the conversation list, in list order.
    ///
    /// Conversations whose contact cannot be resolved are skipped.
    pub fn conversation_summaries(&self) -> Vec<ConversationSummary> {
        let Some(user) = self.current_user() else {
            return Vec::new();
        };

        self.conversations()
            .iter()
            .filter_map(|conversation| {
                let contact = self.contact_for(conversation)?.clone();
                let last = conversation.last_message.as_ref();
                Some(ConversationSummary {
                    conversation_id: conversation.id.clone(),
                    contact,
                    preview: last
                        .map(|m| m.text.clone())
                        .unwrap_or_else(|| NO_MESSAGES_PREVIEW.to_string()),
                    last_message_time: last.and_then(|m| format_clock_time(m.timestamp)),
                    sent_by_current_user: last.is_some_and(|m| m.is_from(&user.id)),
                })
            })
            .collect()
    }

    /// Users the current user can start a chat with.
    ///
    /// A non-blank `query` filters case-insensitively on name or id.
    pub fn available_contacts(&self, query: &str) -> Vec<&User> {
        let Some(user) = self.current_user() else {
            return Vec::new();
        };
        let query = query.trim().to_lowercase();

        self.users()
            .iter()
            .filter(|u| u.id != user.id)
            .filter(|u| {
                query.is_empty()
                    || u.name.to_lowercase().contains(&query)
                    || u.id.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Opens the one-to-one conversation with `target_user_id`.
    ///
    /// Reuses an existing two-party conversation when there is one.
    ///
    /// # Errors
    ///
    /// - `NotLoggedIn` while signed out
    /// - `SelfConversation` if the target is the current user
    /// - `NotFound` if the target is not a known user
    pub fn open_conversation_with(&mut self, target_user_id: &str) -> Result<Conversation> {
        let user_id = self
            .current_user()
            .map(|u| u.id.clone())
            .ok_or(ChatError::NotLoggedIn)?;

        if user_id == target_user_id {
            return Err(ChatError::SelfConversation);
        }
        if self.get_user_by_id(target_user_id).is_none() {
            return Err(ChatError::not_found("user", target_user_id));
        }

        if let Some(existing) = self
            .conversations()
            .iter()
            .find(|c| c.participant_ids.len() == 2 && c.includes(target_user_id))
        {
            return Ok(existing.clone());
        }

        self.start_conversation(target_user_id)?
            .ok_or(ChatError::NotLoggedIn)
    }
}

/// Local `HH:MM` for a millisecond timestamp.
pub fn format_clock_time(timestamp_millis: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(timestamp_millis)
        .single()
        .map(|time| time.format("%H:%M").to_string())
}
