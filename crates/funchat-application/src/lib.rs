//! Application layer for Funchat.
//!
//! Scopes the persistent store to the signed-in user ([`SessionState`]) and
//! implements the use cases driven by the front ends: signing in, sending
//! messages and awaiting bot replies.

pub mod bootstrap;
pub mod chat_service;
pub mod identity_service;
pub mod session;

pub use bootstrap::ChatContext;
pub use chat_service::{ChatService, SendOutcome};
pub use identity_service::{IdentityService, SignIn};
pub use session::{ConversationSummary, SessionState, SharedSessionState};
