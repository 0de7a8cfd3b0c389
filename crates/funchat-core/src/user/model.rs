//! User domain model.

use serde::{Deserialize, Serialize};

/// Ids starting with this prefix belong to automated responders.
pub const BOT_ID_PREFIX: &str = "bot-";

/// A chat participant.
///
/// Users are created at sign-up and never edited afterwards. The `id` is
/// chosen by the person signing up and must be globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Human-assigned unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Avatar image URI
    pub avatar: String,
}

impl User {
    /// Creates a user with the generated avatar for `id`.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            avatar: avatar_url(&id),
            id,
            name: name.into(),
        }
    }

    /// Whether replies for this user come from the automated responder.
    pub fn is_bot(&self) -> bool {
        self.id.starts_with(BOT_ID_PREFIX)
    }

    /// Case-insensitive display name comparison used by sign-in.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Generated avatar URI for a user id.
pub fn avatar_url(id: &str) -> String {
    format!("https://i.pravatar.cc/150?u={id}")
}
