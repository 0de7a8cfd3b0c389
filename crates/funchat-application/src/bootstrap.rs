//! Wiring of store, session and services for a front end.

use crate::chat_service::ChatService;
use crate::identity_service::{IdentityService, SignIn};
use crate::session::{SessionState, SharedSessionState};
use anyhow::{Context, Result};
use funchat_core::config::AppConfig;
use funchat_core::user::default_bots;
use funchat_core::{ChatRepository, MessageClock, Responder, User};
use funchat_infrastructure::config_service::resolve_data_dir;
use funchat_infrastructure::{CollectionStore, FileBackend, IdentityPointer, StorageBackend};
use funchat_interaction::GeminiResponder;
use std::sync::Arc;

/// Everything a front end needs, built once per process.
pub struct ChatContext {
    pub config: AppConfig,
    pub repository: Arc<dyn ChatRepository>,
    pub state: SharedSessionState,
    pub identity: IdentityService,
    pub chat: ChatService,
}

impl ChatContext {
    /// Opens the file store from `config` and the Gemini responder from the
    /// environment.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let data_dir = resolve_data_dir(&config).context("Failed to resolve data directory")?;
        tracing::info!("[Bootstrap] Data directory: {}", data_dir.display());

        let backend = FileBackend::new(&data_dir)
            .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
        let responder = GeminiResponder::from_environment(config.responder.clone());

        Self::with_parts(config, Arc::new(backend), Arc::new(responder))
    }

    /// Builds the context over an explicit backend and responder.
    ///
    /// Seeds the default bots into a never-used backend.
    pub fn with_parts(
        config: AppConfig,
        backend: Arc<dyn StorageBackend>,
        responder: Arc<dyn Responder>,
    ) -> Result<Self> {
        let store = CollectionStore::open(backend.clone(), &default_bots())
            .context("Failed to initialize chat store")?;
        let repository: Arc<dyn ChatRepository> = Arc::new(store);
        let clock = Arc::new(MessageClock::new());

        Ok(Self {
            config,
            state: SessionState::shared(repository.clone()),
            identity: IdentityService::new(
                repository.clone(),
                IdentityPointer::new(backend),
                clock.clone(),
            ),
            chat: ChatService::new(responder, clock),
            repository,
        })
    }

    /// Starts the session for the persisted identity, if any.
    pub async fn restore_session(&self) -> Option<User> {
        let identity = self.identity.current_identity();
        let mut state = self.state.write().await;
        state.start(identity.as_deref());
        state.current_user().cloned()
    }

    /// Signs in and starts the session for the signed-in user.
    pub async fn sign_in(&self, id: &str, name: &str) -> funchat_core::Result<SignIn> {
        let sign_in = self.identity.sign_in(id, name)?;
        self.state.write().await.start(Some(&sign_in.user.id));
        Ok(sign_in)
    }

    /// Clears the active identity and ends the session.
    pub async fn sign_out(&self) -> funchat_core::Result<()> {
        self.identity.sign_out()?;
        self.state.write().await.start(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funchat_core::responder::OFFLINE_REPLY;
    use funchat_infrastructure::MemoryBackend;

    #[tokio::test]
    async fn test_restore_session_follows_pointer() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let offline: Arc<dyn Responder> = Arc::new(GeminiResponder::new(None, Default::default()));

        let context =
            ChatContext::with_parts(AppConfig::default(), backend.clone(), offline.clone())
                .unwrap();
        assert!(context.restore_session().await.is_none());
        context.sign_in("alice", "Alice").await.unwrap();

        let restarted = ChatContext::with_parts(AppConfig::default(), backend, offline).unwrap();
        let user = restarted.restore_session().await.unwrap();
        assert_eq!(user.id, "alice");
        assert_eq!(restarted.state.read().await.conversations().len(), 3);
    }

    #[tokio::test]
    async fn test_sign_out_ends_session() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let offline: Arc<dyn Responder> = Arc::new(GeminiResponder::new(None, Default::default()));
        let context = ChatContext::with_parts(AppConfig::default(), backend, offline).unwrap();
        context.sign_in("alice", "Alice").await.unwrap();

        let conversation_id = context.state.read().await.conversations()[0].id.clone();
        let outcome = context
            .chat
            .send_message(&context.state, &conversation_id, "ping")
            .await
            .unwrap();
        assert_eq!(outcome.reply.map(|m| m.text).as_deref(), Some(OFFLINE_REPLY));

        context.sign_out().await.unwrap();
        assert!(context.state.read().await.current_user().is_none());
        assert!(context.restore_session().await.is_none());
    }
}
