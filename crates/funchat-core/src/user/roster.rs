//! Automated responders shipped with every store.

use super::model::User;

/// The bot users seeded into an empty store.
///
/// Every newly provisioned user gets a conversation with each of them.
pub fn default_bots() -> Vec<User> {
    vec![
        User::new("bot-1", "Gemini Assistant"),
        User::new("bot-2", "Creative Writer Bot"),
        User::new("bot-3", "Code Helper"),
    ]
}
