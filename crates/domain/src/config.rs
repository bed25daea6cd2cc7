//! Client configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Settings for the authenticated API client.
///
/// Every field has a default, so a partial configuration source is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root; request paths are appended to it.
    pub base_url: String,
    /// Endpoint exchanging a refresh token for a new token pair.
    pub refresh_path: String,
    /// Endpoint exchanging a Kakao authorization code for a session.
    pub kakao_login_path: String,
    /// Endpoint revoking the session server-side.
    pub logout_path: String,
    /// Login entry point the application is sent to on terminal auth failure.
    pub login_redirect_path: String,
    /// Response statuses treated as an expired or invalid access token.
    pub auth_failure_statuses: Vec<u16>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User-Agent header value.
    pub user_agent: String,
    /// Where the session is persisted; `None` uses the platform config dir.
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            kakao_login_path: "/auth/kakao/login".to_string(),
            logout_path: "/auth/logout".to_string(),
            login_redirect_path: "/auth/login".to_string(),
            auth_failure_statuses: vec![401],
            timeout_ms: 30_000,
            user_agent: concat!("PopSpot/", env!("CARGO_PKG_VERSION")).to_string(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Returns true if `status` signals an authentication failure.
    #[must_use]
    pub fn is_auth_failure(&self, status: u16) -> bool {
        self.auth_failure_statuses.contains(&status)
    }

    /// Parses the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or not http(s).
    pub fn base(&self) -> DomainResult<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.base_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(DomainError::InvalidUrl(format!(
                "unsupported scheme '{other}' in {}",
                self.base_url
            ))),
        }
    }

    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> DomainResult<()> {
        self.base()?;
        for (name, path) in [
            ("refresh_path", &self.refresh_path),
            ("kakao_login_path", &self.kakao_login_path),
            ("logout_path", &self.logout_path),
            ("login_redirect_path", &self.login_redirect_path),
        ] {
            if !path.starts_with('/') {
                return Err(DomainError::InvalidConfig(format!(
                    "{name} must start with '/': {path}"
                )));
            }
        }
        if self.auth_failure_statuses.is_empty() {
            return Err(DomainError::InvalidConfig(
                "auth_failure_statuses must not be empty".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(DomainError::InvalidConfig(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
