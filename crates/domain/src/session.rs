//! Authenticated session types
//!
//! A [`Session`] is created by a Kakao login, rotated by token refresh and
//! destroyed by logout or an unrecoverable refresh failure.

use serde::{Deserialize, Serialize};

/// Access/refresh credential pair.
///
/// This is the JSON shape returned by the refresh endpoint. Both camelCase
/// (server default) and snake_case keys are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential.
    #[serde(alias = "access_token")]
    pub access_token: String,
    /// Credential exchanged for a new pair when the access token expires.
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a token pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Identity record of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Server-side user id.
    pub id: i64,
    /// Display name taken from the Kakao profile.
    pub nickname: String,
    /// Kakao account email, when the user consented to share it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Kakao profile image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// Response of the Kakao authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Issued access token.
    #[serde(alias = "access_token")]
    pub access_token: String,
    /// Issued refresh token.
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
    /// The authenticated user.
    pub user: UserProfile,
}

impl LoginResponse {
    /// Splits the response into the user and the token pair.
    #[must_use]
    pub fn into_parts(self) -> (UserProfile, TokenPair) {
        (
            self.user,
            TokenPair::new(self.access_token, self.refresh_token),
        )
    }
}

/// Client-side authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Current access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Current refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Logged-in user.
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// Whether a login has completed and not been revoked.
    #[serde(default)]
    pub is_authenticated: bool,
}

impl Session {
    /// Returns a session with no credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns the session established by a successful login.
    #[must_use]
    pub fn authenticated(user: UserProfile, tokens: TokenPair) -> Self {
        Self {
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            user: Some(user),
            is_authenticated: true,
        }
    }

    /// Replaces both tokens, keeping the user.
    ///
    /// Only an authenticated session still holding `exchanged` as its
    /// refresh token is rotated. Returns false, leaving the session
    /// untouched, if it was cleared or replaced in the meantime.
    #[must_use]
    pub fn rotate(&mut self, exchanged: &str, tokens: TokenPair) -> bool {
        if !self.is_authenticated || self.refresh_token.as_deref() != Some(exchanged) {
            return false;
        }
        self.access_token = Some(tokens.access_token);
        self.refresh_token = Some(tokens.refresh_token);
        true
    }

    /// Removes all credentials and the user.
    pub fn clear(&mut self) {
        *self = Self::anonymous();
    }
}

/// Returns a log-safe preview of a token.
///
/// At most 8 characters and never more than half of the token are kept,
/// followed by `...`.
#[must_use]
pub fn token_preview(token: &str) -> String {
    let shown = (token.chars().count() / 2).min(8);
    let head: String = token.chars().take(shown).collect();
    format!("{head}...")
}
