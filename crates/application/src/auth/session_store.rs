//! In-memory session storage.

use std::sync::Arc;

use async_trait::async_trait;
use popspot_domain::{Session, TokenPair, UserProfile};
use tokio::sync::RwLock;

use crate::ports::{SessionError, SessionStore};

/// Thread-safe in-memory session store.
///
/// Clones share the same session.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    session: Arc<RwLock<Session>>,
}

impl InMemorySessionStore {
    /// Creates a store holding an anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Replaces the whole session.
    pub async fn replace(&self, session: Session) {
        *self.session.write().await = session;
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    async fn access_token(&self) -> Option<String> {
        self.session.read().await.access_token.clone()
    }

    async fn refresh_token(&self) -> Option<String> {
        self.session.read().await.refresh_token.clone()
    }

    async fn login(&self, user: UserProfile, tokens: TokenPair) -> Result<(), SessionError> {
        *self.session.write().await = Session::authenticated(user, tokens);
        Ok(())
    }

    async fn update_tokens(&self, exchanged: &str, tokens: TokenPair) -> Result<(), SessionError> {
        if self.session.write().await.rotate(exchanged, tokens) {
            Ok(())
        } else {
            Err(SessionError::Superseded)
        }
    }

    async fn logout(&self) -> Result<(), SessionError> {
        self.session.write().await.clear();
        Ok(())
    }
}
