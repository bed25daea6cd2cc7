//! Session store port
//!
//! Defines the interface for the process-wide authentication session.

use async_trait::async_trait;
use popspot_domain::{Session, TokenPair, UserProfile};

/// Errors that can occur while persisting the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The session was logged out or replaced while its tokens were being refreshed.
    #[error("session changed during token refresh")]
    Superseded,
}

/// Store owning the current [`Session`].
///
/// Only login, logout and token refresh mutate the session. Reads never
/// fail; a failed write still updates the in-process state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns a snapshot of the session.
    async fn session(&self) -> Session;

    /// Returns the current access token.
    async fn access_token(&self) -> Option<String> {
        self.session().await.access_token
    }

    /// Returns the current refresh token.
    async fn refresh_token(&self) -> Option<String> {
        self.session().await.refresh_token
    }

    /// Returns the logged-in user.
    async fn user(&self) -> Option<UserProfile> {
        self.session().await.user
    }

    /// Establishes a new session.
    ///
    /// # Errors
    /// Returns an error if the session cannot be persisted.
    async fn login(&self, user: UserProfile, tokens: TokenPair) -> Result<(), SessionError>;

    /// Replaces the tokens of the session that still holds `exchanged` as
    /// its refresh token.
    ///
    /// # Errors
    /// Returns `Superseded` without touching the session if it was logged
    /// out or replaced since `exchanged` was read, or another error if the
    /// session cannot be persisted.
    async fn update_tokens(&self, exchanged: &str, tokens: TokenPair) -> Result<(), SessionError>;

    /// Destroys the session.
    ///
    /// # Errors
    /// Returns an error if the persisted session cannot be removed.
    async fn logout(&self) -> Result<(), SessionError>;
}
