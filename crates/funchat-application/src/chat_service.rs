//! Sending messages and collecting bot replies.

use crate::session::SharedSessionState;
use funchat_core::{ChatError, Message, MessageClock, MessageStatus, Responder, Result, User};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Messages written by one [`ChatService::send_message`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub message: Message,
    /// The bot's reply; `None` for human contacts or if the session ended
    /// while the reply was pending.
    pub reply: Option<Message>,
}

/// Send flow of the chat view.
///
/// At most one send per conversation is in flight. The session lock is not
/// held while the responder is awaited, so other conversations stay usable.
pub struct ChatService {
    responder: Arc<dyn Responder>,
    clock: Arc<MessageClock>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ChatService {
    pub fn new(responder: Arc<dyn Responder>, clock: Arc<MessageClock>) -> Self {
        Self {
            responder,
            clock,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Whether a reply is pending for `conversation_id`.
    pub fn is_typing(&self, conversation_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(conversation_id)
    }

    /// Appends the current user's message and, for bot contacts, the bot's
    /// reply.
    ///
    /// # Errors
    ///
    /// - `Validation` if `text` is blank
    /// - `ResponsePending` if a reply is already pending for the conversation
    /// - `NotLoggedIn` / `NotFound` if the conversation is not in the session
    pub async fn send_message(
        &self,
        state: &SharedSessionState,
        conversation_id: &str,
        text: &str,
    ) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::validation("Message text cannot be empty."));
        }

        let _guard = InFlightGuard::acquire(&self.in_flight, conversation_id)?;

        let (sender_id, message, bot) = {
            let mut session = state.write().await;
            let user = session
                .current_user()
                .cloned()
                .ok_or(ChatError::NotLoggedIn)?;
            let conversation = session
                .conversations()
                .iter()
                .find(|c| c.id == conversation_id)
                .cloned()
                .ok_or_else(|| ChatError::not_found("conversation", conversation_id))?;
            let bot = session
                .contact_for(&conversation)
                .filter(|contact| contact.is_bot())
                .cloned();

            let message = Message::new(
                conversation_id,
                &user.id,
                text,
                MessageStatus::Sent,
                &self.clock,
            );
            session.add_message(message.clone())?;
            (user.id, message, bot)
        };

        let Some(bot) = bot else {
            return Ok(SendOutcome {
                message,
                reply: None,
            });
        };

        let reply = self.await_reply(conversation_id, text, &bot).await;

        let mut session = state.write().await;
        if session.current_user().map(|u| u.id.as_str()) != Some(sender_id.as_str()) {
            tracing::debug!(
                "[Chat] Session changed while awaiting {}; dropping reply",
                bot.id
            );
            return Ok(SendOutcome {
                message,
                reply: None,
            });
        }
        session.add_message(reply.clone())?;

        Ok(SendOutcome {
            message,
            reply: Some(reply),
        })
    }

    async fn await_reply(&self, conversation_id: &str, text: &str, bot: &User) -> Message {
        tracing::debug!("[Chat] Awaiting reply from {} in {}", bot.id, conversation_id);
        let reply_text = self.responder.get_response(text, &bot.name).await;
        Message::new(
            conversation_id,
            &bot.id,
            reply_text,
            MessageStatus::Delivered,
            &self.clock,
        )
    }
}

/// Marks a conversation in flight until dropped.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    conversation_id: String,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<String>>>, conversation_id: &str) -> Result<Self> {
        let inserted = in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(conversation_id.to_string());
        if !inserted {
            return Err(ChatError::ResponsePending(conversation_id.to_string()));
        }

        Ok(Self {
            in_flight: Arc::clone(in_flight),
            conversation_id: conversation_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.conversation_id);
    }
}
