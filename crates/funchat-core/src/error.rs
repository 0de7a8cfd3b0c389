//! Error types for the Funchat application.

use thiserror::Error;

/// A shared error type for the entire Funchat workspace.
///
/// Absence of data is never an error in the store or the session layer;
/// lookups return `Option` instead. The variants below cover identity
/// provisioning, send-flow rules and backend failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Identity input rejected before any store interaction
    #[error("{0}")]
    Validation(String),

    /// The identifier is already bound to a different display name
    #[error("ID \"{id}\" is already taken by another user.")]
    Conflict { id: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The target of a new chat is the signed-in user
    #[error("You cannot start a conversation with yourself.")]
    SelfConversation,

    /// A responder reply is still outstanding for the conversation
    #[error("A reply is still pending for conversation '{0}'")]
    ResponsePending(String),

    /// No identity is active for the session
    #[error("No user is signed in")]
    NotLoggedIn,

    /// Storage backend error (file system, key-value store)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Conflict error
    pub fn conflict(id: impl Into<String>) -> Self {
        Self::Conflict { id: id.into() }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true for errors that carry text meant to be shown to the user
    /// as-is (login form, new chat screen).
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Conflict { .. } | Self::SelfConversation
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ChatError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_the_id() {
        let err = ChatError::conflict("alice");
        assert_eq!(err.to_string(), "ID \"alice\" is already taken by another user.");
        assert!(err.is_conflict());
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_storage_errors_are_not_user_facing() {
        let err: ChatError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, ChatError::Storage(_)));
        assert!(!err.is_user_facing());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: ChatError = serde_json::from_str::<Vec<u32>>("not json").unwrap_err().into();
        match err {
            ChatError::Serialization { format, .. } => assert_eq!(format, "JSON"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
