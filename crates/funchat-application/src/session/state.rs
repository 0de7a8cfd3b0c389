use funchat_core::{ChatRepository, Conversation, Message, Result, User};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Session state shared between the front end and the use cases.
pub type SharedSessionState = Arc<RwLock<SessionState>>;

/// In-memory projection of the store for the signed-in user.
///
/// `SessionState` is responsible for:
/// - Resolving the current user once per session start
/// - Lazily loading message history per conversation
/// - Writing new messages through to the store
/// - Re-deriving the conversation list whenever the message projection changes
///
/// The conversation list is always re-read from the repository (where
/// `last_message` is authoritative), never rebuilt from the message map.
///
/// While no user is signed in every conversation and message operation is a
/// no-op returning empty results.
pub struct SessionState {
    repository: Arc<dyn ChatRepository>,
    current_user: Option<User>,
    users: Vec<User>,
    conversations: Vec<Conversation>,
    /// Loaded histories keyed by conversation id. Presence of a key means
    /// the conversation is loaded.
    messages: HashMap<String, Vec<Message>>,
}

impl SessionState {
    /// Creates a signed-out session over `repository`.
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self {
            repository,
            current_user: None,
            users: Vec::new(),
            conversations: Vec::new(),
            messages: HashMap::new(),
        }
    }

    /// Wraps a new session for sharing across tasks.
    pub fn shared(repository: Arc<dyn ChatRepository>) -> SharedSessionState {
        Arc::new(RwLock::new(Self::new(repository)))
    }

    /// Starts a session for `active_identity`.
    ///
    /// Reloads the user list and drops every loaded history. If the identity
    /// does not resolve to a known user the session stays signed out.
    pub fn start(&mut self, active_identity: Option<&str>) {
        self.users = self.repository.get_users();
        self.messages.clear();
        self.current_user = active_identity
            .and_then(|id| self.users.iter().find(|u| u.id == id))
            .cloned();

        match (&self.current_user, active_identity) {
            (Some(user), _) => tracing::info!("[Session] Started session for {}", user.id),
            (None, Some(id)) => {
                tracing::warn!("[Session] Active identity {} is not a known user", id)
            }
            (None, None) => tracing::debug!("[Session] No active identity"),
        }

        self.refresh_conversations();
    }

    pub fn repository(&self) -> &Arc<dyn ChatRepository> {
        &self.repository
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Conversations of the current user, most recent activity first.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Loaded history of `conversation_id`, empty if not loaded.
    pub fn messages_for(&self, conversation_id: &str) -> &[Message] {
        self.messages
            .get(conversation_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_loaded(&self, conversation_id: &str) -> bool {
        self.messages.contains_key(conversation_id)
    }

    /// Looks up a user in the session's user list (not the store).
    pub fn get_user_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Loads the history of `conversation_id` unless it is already loaded.
    pub fn load_messages(&mut self, conversation_id: &str) {
        if self.current_user.is_none() || self.is_loaded(conversation_id) {
            return;
        }

        let history = self.repository.get_messages(conversation_id);
        tracing::debug!(
            "[Session] Loaded {} messages for {}",
            history.len(),
            conversation_id
        );
        self.messages.insert(conversation_id.to_string(), history);
        self.refresh_conversations();
    }

    /// Writes `message` to the store, then appends it to the projection.
    ///
    /// For a conversation that was not loaded yet the full history is
    /// installed from the store, which already contains `message`.
    pub fn add_message(&mut self, message: Message) -> Result<()> {
        if self.current_user.is_none() {
            tracing::debug!(
                "[Session] Ignoring message {} while signed out",
                message.id
            );
            return Ok(());
        }

        self.repository.add_message(&message)?;

        match self.messages.entry(message.conversation_id.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(message),
            Entry::Vacant(entry) => {
                entry.insert(self.repository.get_messages(&message.conversation_id));
            }
        }

        self.refresh_conversations();
        Ok(())
    }

    /// Returns the conversation between the current user and
    /// `target_user_id`, creating it if needed.
    ///
    /// Returns `Ok(None)` while signed out. Self-conversations are not
    /// rejected here.
    pub fn start_conversation(&mut self, target_user_id: &str) -> Result<Option<Conversation>> {
        let Some(user) = &self.current_user else {
            return Ok(None);
        };

        let participants = [user.id.clone(), target_user_id.to_string()];
        let conversation = self.repository.create_conversation(&participants)?;
        self.refresh_conversations();
        Ok(Some(conversation))
    }

    fn refresh_conversations(&mut self) {
        self.conversations = match &self.current_user {
            Some(user) => self.repository.get_conversations_for_user(&user.id),
            None => Vec::new(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funchat_core::user::default_bots;
    use funchat_core::{MessageClock, MessageStatus};
    use funchat_infrastructure::{CollectionStore, MemoryBackend};

    fn repository() -> Arc<dyn ChatRepository> {
        let store = CollectionStore::open(Arc::new(MemoryBackend::new()), &default_bots()).unwrap();
        store.add_user(User::new("u1", "Alice")).unwrap();
        Arc::new(store)
    }

    fn signed_in() -> SessionState {
        let mut state = SessionState::new(repository());
        state.start(Some("u1"));
        state
    }

    #[test]
    fn test_start_resolves_current_user() {
        let state = signed_in();

        assert_eq!(state.current_user().map(|u| u.name.as_str()), Some("Alice"));
        assert_eq!(state.users().len(), 4);
        assert!(state.get_user_by_id("bot-2").is_some());
    }

    #[test]
    fn test_unknown_identity_stays_signed_out() {
        let mut state = SessionState::new(repository());
        state.start(Some("ghost"));

        assert!(state.current_user().is_none());
        assert!(state.start_conversation("bot-1").unwrap().is_none());
        assert!(state.conversations().is_empty());

        state.load_messages("conv-1");
        assert!(!state.is_loaded("conv-1"));
    }

    #[test]
    fn test_signed_out_add_message_is_ignored() {
        let repository = repository();
        let mut state = SessionState::new(repository.clone());
        let clock = MessageClock::new();

        let message = Message::new("conv-1", "u1", "hi", MessageStatus::Sent, &clock);
        state.add_message(message).unwrap();

        assert!(repository.get_messages("conv-1").is_empty());
    }

    #[test]
    fn test_load_messages_is_idempotent() {
        let mut state = signed_in();
        let clock = MessageClock::new();
        let conversation = state.start_conversation("bot-1").unwrap().unwrap();

        state.load_messages(&conversation.id);
        let message = Message::new(&conversation.id, "u1", "hello", MessageStatus::Sent, &clock);
        state.add_message(message).unwrap();
        state.load_messages(&conversation.id);

        assert_eq!(state.messages_for(&conversation.id).len(), 1);
    }

    #[test]
    fn test_add_message_to_unloaded_conversation_installs_history() {
        let repository = repository();
        let clock = MessageClock::new();
        let conversation = repository
            .create_conversation(&["u1".to_string(), "bot-1".to_string()])
            .unwrap();
        let earlier = Message::new(
            &conversation.id,
            "bot-1",
            "welcome",
            MessageStatus::Delivered,
            &clock,
        );
        repository.add_message(&earlier).unwrap();

        let mut state = SessionState::new(repository);
        state.start(Some("u1"));
        let message = Message::new(&conversation.id, "u1", "hello", MessageStatus::Sent, &clock);
        state.add_message(message).unwrap();

        let texts: Vec<&str> = state
            .messages_for(&conversation.id)
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, vec!["welcome", "hello"]);
    }

    #[test]
    fn test_add_message_moves_conversation_to_top() {
        let mut state = signed_in();
        let clock = MessageClock::new();
        let first = state.start_conversation("bot-1").unwrap().unwrap();
        let second = state.start_conversation("bot-2").unwrap().unwrap();

        state
            .add_message(Message::new(&second.id, "u1", "a", MessageStatus::Sent, &clock))
            .unwrap();
        state
            .add_message(Message::new(&first.id, "u1", "b", MessageStatus::Sent, &clock))
            .unwrap();

        assert_eq!(state.conversations()[0].id, first.id);
        assert_eq!(
            state.conversations()[0].last_message.as_ref().map(|m| m.text.as_str()),
            Some("b")
        );
    }

    #[test]
    fn test_start_conversation_is_idempotent() {
        let mut state = signed_in();

        let first = state.start_conversation("bot-3").unwrap().unwrap();
        let second = state.start_conversation("bot-3").unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(state.conversations().len(), 1);
    }

    #[test]
    fn test_self_conversation_does_not_shadow_bot_chat() {
        let mut state = signed_in();

        let self_chat = state.start_conversation("u1").unwrap().unwrap();
        let bot_chat = state.start_conversation("bot-1").unwrap().unwrap();

        assert_ne!(self_chat.id, bot_chat.id);
        assert!(bot_chat.includes("bot-1"));
        assert_eq!(state.conversations().len(), 2);
    }

    #[test]
    fn test_restart_drops_loaded_histories() {
        let mut state = signed_in();
        let conversation = state.start_conversation("bot-1").unwrap().unwrap();
        state.load_messages(&conversation.id);

        state.start(Some("u1"));

        assert!(!state.is_loaded(&conversation.id));
        assert_eq!(state.conversations().len(), 1);
    }
}
