//! Domain layer for Funchat.
//!
//! Holds the entities persisted by the local store (users, conversations,
//! messages), the contracts implemented by the outer layers
//! ([`ChatRepository`], [`Responder`]) and the shared error type.

pub mod config;
pub mod conversation;
pub mod error;
pub mod message;
pub mod repository;
pub mod responder;
pub mod user;

pub use conversation::Conversation;
pub use error::{ChatError, Result};
pub use message::{Message, MessageClock, MessageStatus};
pub use repository::ChatRepository;
pub use responder::Responder;
pub use user::User;
