//! Sign-in and user provisioning.

use funchat_core::{ChatError, ChatRepository, Message, MessageClock, MessageStatus, Result, User};
use funchat_infrastructure::IdentityPointer;
use std::sync::Arc;

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SignIn {
    pub user: User,
    /// True when the user was provisioned by this sign-in
    pub is_new: bool,
}

/// Resolves or provisions users and tracks the active identity.
///
/// New users get a conversation with every bot in the store, each opened
/// with a welcome message from the bot.
pub struct IdentityService {
    repository: Arc<dyn ChatRepository>,
    pointer: IdentityPointer,
    clock: Arc<MessageClock>,
}

impl IdentityService {
    pub fn new(
        repository: Arc<dyn ChatRepository>,
        pointer: IdentityPointer,
        clock: Arc<MessageClock>,
    ) -> Self {
        Self {
            repository,
            pointer,
            clock,
        }
    }

    /// Checks a sign-in attempt without writing anything.
    ///
    /// # Returns
    ///
    /// The existing user bound to `id`, or `None` if `id` is free.
    ///
    /// # Errors
    ///
    /// - `Validation` for blank fields or an id containing whitespace
    /// - `Conflict` if `id` belongs to a user with a different name
    pub fn validate(&self, id: &str, name: &str) -> Result<Option<User>> {
        let (id, name) = (id.trim(), name.trim());

        if id.is_empty() || name.is_empty() {
            return Err(ChatError::validation("Both Unique ID and Name are required."));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(ChatError::validation("Unique ID cannot contain spaces."));
        }

        match self.repository.get_user_by_id(id) {
            Some(existing) if !existing.has_name(name) => Err(ChatError::conflict(id)),
            existing => Ok(existing),
        }
    }

    /// Signs in as `id`, provisioning the user on first use, and records the
    /// active identity.
    pub fn sign_in(&self, id: &str, name: &str) -> Result<SignIn> {
        let sign_in = match self.validate(id, name)? {
            Some(user) => SignIn {
                user,
                is_new: false,
            },
            None => SignIn {
                user: self.provision(User::new(id.trim(), name.trim()))?,
                is_new: true,
            },
        };

        self.pointer.set(&sign_in.user.id)?;
        tracing::info!(
            "[Identity] Signed in as {} (new: {})",
            sign_in.user.id,
            sign_in.is_new
        );
        Ok(sign_in)
    }

    pub fn sign_out(&self) -> Result<()> {
        tracing::info!("[Identity] Signed out");
        self.pointer.clear()
    }

    /// Id of the active identity, if any.
    pub fn current_identity(&self) -> Option<String> {
        self.pointer.get()
    }

    fn provision(&self, user: User) -> Result<User> {
        if !self.repository.add_user(user.clone())? {
            return Err(ChatError::conflict(user.id));
        }

        let bots: Vec<User> = self
            .repository
            .get_users()
            .into_iter()
            .filter(User::is_bot)
            .collect();

        for bot in &bots {
            let conversation = self
                .repository
                .create_conversation(&[user.id.clone(), bot.id.clone()])?;
            let welcome = Message::new(
                &conversation.id,
                &bot.id,
                format!("Hi {}! I'm {}, ready to chat.", user.name, bot.name),
                MessageStatus::Delivered,
                &self.clock,
            );
            self.repository.add_message(&welcome)?;
        }

        tracing::debug!(
            "[Identity] Provisioned {} with {} bot conversations",
            user.id,
            bots.len()
        );
        Ok(user)
    }
}
