//! Kakao login, logout and current-user calls.

use std::sync::Arc;

use popspot_domain::{DomainError, LoginResponse, QueryParams, RequestSpec, UserProfile};
use serde::Serialize;
use tracing::{debug, info};

use super::error::{ApiError, ApiResult};
use crate::client::AuthenticatedClient;

/// Body of the authorization-code exchange.
#[derive(Debug, Serialize)]
struct KakaoLoginRequest<'a> {
    code: &'a str,
}

/// Use cases around the user's session.
#[derive(Clone)]
pub struct AuthApi {
    client: Arc<AuthenticatedClient>,
}

impl AuthApi {
    /// Creates the API over a shared client.
    pub const fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    /// Exchanges a Kakao authorization code for a session and stores it.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is empty, the exchange fails, or the
    /// session cannot be stored.
    pub async fn login_with_kakao(&self, code: &str) -> ApiResult<UserProfile> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::InvalidInput(DomainError::InvalidBody(
                "authorization code is empty".to_string(),
            )));
        }

        let path = self.client.config().kakao_login_path.clone();
        let response: LoginResponse = self
            .client
            .post_json(&path, &KakaoLoginRequest { code })
            .await?;

        let (user, tokens) = response.into_parts();
        self.client.session().login(user.clone(), tokens).await?;
        info!(user_id = user.id, nickname = %user.nickname, "logged in with Kakao");
        Ok(user)
    }

    /// Revokes the session server-side when possible, then clears it locally.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local session cannot be removed.
    pub async fn logout(&self) -> ApiResult<()> {
        if self.client.session().access_token().await.is_some() {
            let path = self.client.config().logout_path.clone();
            if let Err(error) = self.client.execute(RequestSpec::post(path)).await {
                debug!(%error, "server-side logout failed");
            }
        }
        self.client.session().logout().await?;
        info!("logged out");
        Ok(())
    }

    /// Fetches the logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.client.get_json("/users/me", QueryParams::new()).await
    }
}
