//! File-backed session store.
//!
//! The session is kept in memory and mirrored to a JSON file so a login
//! survives restarts:
//! ```json
//! {
//!   "accessToken": "eyJhbGciOi...",
//!   "refreshToken": "eyJhbGciOi...",
//!   "user": { "id": 7, "nickname": "gallery-goer" },
//!   "isAuthenticated": true
//! }
//! ```
//! The file holds live credentials; it is written with owner-only
//! permissions on Unix.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use popspot_application::{InMemorySessionStore, SessionError, SessionStore};
use popspot_domain::{Session, TokenPair, UserProfile};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Session store persisted to a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
    memory: InMemorySessionStore,
    /// Serializes file writes so the last mutation wins on disk.
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Opens the store, loading the session from `path` if it exists.
    ///
    /// A missing file, or one whose content is not a session, yields an
    /// anonymous session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let session = match fs::read(&path).await {
            Ok(content) => from_json_bytes::<Session>(&content).unwrap_or_else(|error| {
                warn!(path = %path.display(), %error, "ignoring corrupt session file");
                Session::anonymous()
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Session::anonymous(),
            Err(error) => return Err(SessionError::Io(error)),
        };
        debug!(
            path = %path.display(),
            authenticated = session.is_authenticated,
            "session loaded"
        );

        Ok(Self {
            path,
            memory: InMemorySessionStore::with_session(session),
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the session file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current in-memory session to disk.
    async fn persist(&self) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().await;
        let session = self.memory.session().await;
        let content = to_json_stable_bytes(&session)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &content).await?;
        restrict_permissions(&tmp).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn remove_file(&self) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SessionError::Io(error)),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn session(&self) -> Session {
        self.memory.session().await
    }

    async fn access_token(&self) -> Option<String> {
        self.memory.access_token().await
    }

    async fn refresh_token(&self) -> Option<String> {
        self.memory.refresh_token().await
    }

    async fn login(&self, user: UserProfile, tokens: TokenPair) -> Result<(), SessionError> {
        self.memory.login(user, tokens).await?;
        self.persist().await
    }

    async fn update_tokens(&self, exchanged: &str, tokens: TokenPair) -> Result<(), SessionError> {
        self.memory.update_tokens(exchanged, tokens).await?;
        self.persist().await
    }

    async fn logout(&self) -> Result<(), SessionError> {
        self.memory.logout().await?;
        self.remove_file().await
    }
}
