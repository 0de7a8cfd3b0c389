//! Whole-collection implementation of the persistent store.
//!
//! Each collection (users, conversations, messages) is one JSON array under a
//! stable key of the injected [`StorageBackend`]. Every operation re-reads the
//! collection it needs and every mutation rewrites it in full; nothing is
//! cached between calls.

use crate::storage::StorageBackend;
use funchat_core::repository::{sort_by_recent_activity, sort_chronologically};
use funchat_core::{ChatRepository, Conversation, Message, Result, User};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub const USERS_KEY: &str = "chat_app_users";
pub const CONVERSATIONS_KEY: &str = "chat_app_conversations";
pub const MESSAGES_KEY: &str = "chat_app_messages";

/// A [`ChatRepository`] over a flat key/blob backend.
///
/// Responsibilities:
/// - (De)serialize whole collections as JSON arrays
/// - Derived queries (per-user conversation list, per-conversation messages)
/// - Keep `Conversation::last_message` in step with message writes
///
/// Does NOT:
/// - Lock: a single writer is assumed; concurrent writers lose updates
/// - Repair inconsistencies between collections
#[derive(Clone)]
pub struct CollectionStore {
    backend: Arc<dyn StorageBackend>,
}

impl CollectionStore {
    /// Wraps `backend` without touching it.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Wraps `backend` and seeds it with `bots` if it has never been used.
    pub fn open(backend: Arc<dyn StorageBackend>, bots: &[User]) -> Result<Self> {
        let store = Self::new(backend);
        store.seed(bots)?;
        Ok(store)
    }

    /// Initializes missing collections.
    ///
    /// The user collection is seeded with `bots` only when the key is absent;
    /// an existing (even empty) user list is left alone. Conversation and
    /// message collections are created empty when absent. A key that cannot
    /// be read is left untouched and reads as empty later.
    pub fn seed(&self, bots: &[User]) -> Result<()> {
        if self.is_absent(USERS_KEY) {
            tracing::info!("[Store] Seeding {} bot users", bots.len());
            self.save(USERS_KEY, bots)?;
        }
        if self.is_absent(CONVERSATIONS_KEY) {
            self.save::<Conversation>(CONVERSATIONS_KEY, &[])?;
        }
        if self.is_absent(MESSAGES_KEY) {
            self.save::<Message>(MESSAGES_KEY, &[])?;
        }
        Ok(())
    }

    fn is_absent(&self, key: &str) -> bool {
        match self.backend.read(key) {
            Ok(value) => value.is_none(),
            Err(e) => {
                tracing::warn!("[Store] Failed to read '{}', leaving it as is: {}", key, e);
                false
            }
        }
    }

    /// Reads a collection, treating anything unreadable as empty.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("[Store] Failed to read '{}', using empty collection: {}", key, e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("[Store] Corrupted collection '{}', using empty collection: {}", key, e);
            Vec::new()
        })
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.backend.write(key, &raw)
    }
}

impl ChatRepository for CollectionStore {
    fn get_users(&self) -> Vec<User> {
        self.load(USERS_KEY)
    }

    fn add_user(&self, user: User) -> Result<bool> {
        let mut users: Vec<User> = self.load(USERS_KEY);
        if users.iter().any(|u| u.id == user.id) {
            tracing::warn!("[Store] User with id {} already exists.", user.id);
            return Ok(false);
        }

        tracing::debug!("[Store] Adding user {}", user.id);
        users.push(user);
        self.save(USERS_KEY, &users)?;
        Ok(true)
    }

    fn get_conversations_for_user(&self, user_id: &str) -> Vec<Conversation> {
        let mut conversations: Vec<Conversation> = self
            .load::<Conversation>(CONVERSATIONS_KEY)
            .into_iter()
            .filter(|c| c.includes(user_id))
            .collect();
        sort_by_recent_activity(&mut conversations);
        conversations
    }

    fn create_conversation(&self, participant_ids: &[String]) -> Result<Conversation> {
        let mut conversations: Vec<Conversation> = self.load(CONVERSATIONS_KEY);

        if let Some(existing) = conversations
            .iter()
            .find(|c| c.has_participant_set(participant_ids))
        {
            return Ok(existing.clone());
        }

        let conversation = Conversation::new(participant_ids.to_vec());
        tracing::debug!(
            "[Store] Created conversation {} for {:?}",
            conversation.id,
            participant_ids
        );
        conversations.push(conversation.clone());
        self.save(CONVERSATIONS_KEY, &conversations)?;
        Ok(conversation)
    }

    fn get_messages(&self, conversation_id: &str) -> Vec<Message> {
        let mut messages: Vec<Message> = self
            .load::<Message>(MESSAGES_KEY)
            .into_iter()
            .filter(|m| m.conversation_id == conversation_id)
            .collect();
        sort_chronologically(&mut messages);
        messages
    }

    fn add_message(&self, message: &Message) -> Result<()> {
        let mut messages: Vec<Message> = self.load(MESSAGES_KEY);
        messages.push(message.clone());
        self.save(MESSAGES_KEY, &messages)?;

        let mut conversations: Vec<Conversation> = self.load(CONVERSATIONS_KEY);
        match conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
        {
            Some(conversation) => {
                conversation.last_message = Some(message.clone());
                self.save(CONVERSATIONS_KEY, &conversations)?;
            }
            None => {
                tracing::debug!(
                    "[Store] Message {} references unknown conversation {}",
                    message.id,
                    message.conversation_id
                );
            }
        }
        Ok(())
    }
}
