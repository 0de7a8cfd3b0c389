//! Automated responder contract.

use async_trait::async_trait;

/// Reply used when no credential is configured for the text service.
pub const OFFLINE_REPLY: &str = "API Key not configured. The bot is currently offline.";

/// Reply used when the text service fails for any other reason.
pub const CONNECTION_FAILURE_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

/// Produces the bot side of a conversation.
///
/// Implementations never fail towards the caller: every internal failure
/// (missing credential, network error, malformed response) is converted into
/// a human-readable fallback text. The returned text is never empty.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Generates a reply to `message` spoken as `responder_name`.
    async fn get_response(&self, message: &str, responder_name: &str) -> String;
}
