//! Bearer-token client with refresh-and-replay on authentication failure.

use std::sync::Arc;

use popspot_domain::{ClientConfig, RequestSpec, ResponseSpec, TokenPair, token_preview};
use tracing::{debug, info, warn};

use super::coordinator::{Admission, RefreshCoordinator, RefreshGuard};
use super::error::{ClientError, ClientResult, RefreshError};
use crate::ports::{HttpTransport, Navigator, SessionError, SessionStore};

/// Collaborators shared by the client and the rest of the application.
#[derive(Clone)]
pub struct ClientContext {
    /// Owner of the credentials.
    pub session: Arc<dyn SessionStore>,
    /// Used to send the user to the login entry point.
    pub navigator: Arc<dyn Navigator>,
}

impl ClientContext {
    /// Creates a context.
    pub fn new(session: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

/// Drop-in HTTP client that manages bearer credentials.
///
/// Callers never see an expired-token response when a refresh can fix it:
/// the failing request is replayed once with the refreshed token. When the
/// session cannot be recovered the session is cleared, the navigator is
/// sent to the login path and the caller gets an error.
///
/// Each client owns its refresh coordinator, so separate clients (for
/// example in tests) never share refresh state.
pub struct AuthenticatedClient {
    transport: Arc<dyn HttpTransport>,
    context: ClientContext,
    config: ClientConfig,
    refresh: RefreshCoordinator,
}

impl AuthenticatedClient {
    /// Creates a client over `transport`.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        context: ClientContext,
        config: ClientConfig,
    ) -> Self {
        Self {
            transport,
            context,
            config,
            refresh: RefreshCoordinator::new(),
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the session store.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.context.session
    }

    /// Returns true while a token refresh is outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    /// Returns the number of requests waiting on the running refresh.
    #[must_use]
    pub fn queued_requests(&self) -> usize {
        self.refresh.queued()
    }

    /// Sends a request with the current access token.
    ///
    /// Statuses other than the configured authentication failures are
    /// returned as-is, including error statuses.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the descriptor is malformed
    /// - `Transport` if no response could be obtained
    /// - `Unauthorized` if authentication failed and no refresh was possible,
    ///   or the replay was rejected again
    /// - `RefreshFailed` if the token refresh failed
    pub async fn send(&self, request: RequestSpec) -> ClientResult<ResponseSpec> {
        request.validate()?;
        let request = self.authorize(request).await;
        let response = self.dispatch(&request).await?;

        if self.is_auth_failure(&response) {
            self.recover(request, response).await
        } else {
            Ok(response)
        }
    }

    /// Attaches the current access token, if any.
    async fn authorize(&self, request: RequestSpec) -> RequestSpec {
        match self.context.session.access_token().await {
            Some(token) => request.authorized(&token),
            None => request,
        }
    }

    async fn dispatch(&self, request: &RequestSpec) -> ClientResult<ResponseSpec> {
        debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            attempt = ?request.attempt(),
            "sending request"
        );
        let response = self.transport.execute(request).await?;
        debug!(
            request_id = %request.id,
            status = response.status.as_u16(),
            elapsed_ms = response.duration.as_millis(),
            "response received"
        );
        Ok(response)
    }

    fn is_auth_failure(&self, response: &ResponseSpec) -> bool {
        self.config.is_auth_failure(response.status.as_u16())
    }

    /// Handles an authentication failure on `request`.
    async fn recover(
        &self,
        request: RequestSpec,
        failure: ResponseSpec,
    ) -> ClientResult<ResponseSpec> {
        if request.attempt().is_replay() {
            warn!(request_id = %request.id, "replayed request rejected again");
            return Err(self.fail_terminal(&failure).await);
        }

        let Some(refresh_token) = self.context.session.refresh_token().await else {
            warn!(request_id = %request.id, "authentication failed without a refresh token");
            return Err(self.fail_terminal(&failure).await);
        };

        match self.refresh.admit() {
            Admission::Queued(outcome) => {
                debug!(request_id = %request.id, "waiting for in-flight token refresh");
                match outcome.await {
                    Ok(Ok(token)) => self.replay(&request, &token).await,
                    Ok(Err(error)) => Err(ClientError::RefreshFailed(error)),
                    Err(_) => Err(ClientError::RefreshFailed(RefreshError::Aborted)),
                }
            }
            Admission::Owner(guard) => {
                info!(
                    request_id = %request.id,
                    refresh_token = %token_preview(&refresh_token),
                    "refreshing access token"
                );
                let access_token = self.refresh_as_owner(guard, &refresh_token).await?;
                self.replay(&request, &access_token).await
            }
        }
    }

    /// Runs the refresh this request owns and settles the queue.
    ///
    /// The new tokens are only stored if the session still holds
    /// `refresh_token`; a session logged out or replaced meanwhile is left
    /// alone and the refresh counts as failed.
    async fn refresh_as_owner(
        &self,
        mut guard: RefreshGuard<'_>,
        refresh_token: &str,
    ) -> ClientResult<String> {
        let tokens = match self.exchange(refresh_token).await {
            Ok(tokens) => tokens,
            Err(error) => {
                self.clear_session().await;
                let notified = guard.settle(Err(error.clone()));
                warn!(%error, rejected = notified, "token refresh failed");
                self.redirect_to_login();
                return Err(ClientError::RefreshFailed(error));
            }
        };

        // Queued requests still get the token if this future is dropped
        // while the session is being updated.
        guard.obtained(&tokens.access_token);
        let access_token = tokens.access_token.clone();
        match self.context.session.update_tokens(refresh_token, tokens).await {
            Ok(()) => {}
            Err(SessionError::Superseded) => {
                let error = RefreshError::SessionEnded;
                let notified = guard.settle(Err(error.clone()));
                warn!(rejected = notified, "session ended while refreshing, discarding tokens");
                self.redirect_to_login();
                return Err(ClientError::RefreshFailed(error));
            }
            Err(error) => warn!(%error, "could not persist refreshed tokens"),
        }

        let notified = guard.settle(Ok(access_token.clone()));
        info!(queued = notified, "access token refreshed");
        Ok(access_token)
    }

    /// Sends the one allowed replay of `request` with `token`.
    async fn replay(&self, request: &RequestSpec, token: &str) -> ClientResult<ResponseSpec> {
        let replay = request.replay_with(token);
        let response = self.dispatch(&replay).await?;
        if self.is_auth_failure(&response) {
            warn!(request_id = %replay.id, "replayed request rejected again");
            return Err(self.fail_terminal(&response).await);
        }
        Ok(response)
    }

    /// Exchanges the refresh token for a new token pair.
    ///
    /// Goes straight to the transport so a rejected refresh is never
    /// itself intercepted.
    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        let request =
            RequestSpec::post(self.config.refresh_path.as_str()).authorized(refresh_token);
        let response = self.transport.execute(&request).await?;
        if !response.is_success() {
            return Err(RefreshError::Rejected {
                status: response.status.as_u16(),
                body: response.text(),
            });
        }
        response
            .json::<TokenPair>()
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))
    }

    async fn fail_terminal(&self, failure: &ResponseSpec) -> ClientError {
        self.clear_session().await;
        self.redirect_to_login();
        ClientError::unauthorized(failure)
    }

    async fn clear_session(&self) {
        if let Err(error) = self.context.session.logout().await {
            warn!(%error, "could not remove persisted session");
        }
    }

    fn redirect_to_login(&self) {
        info!(path = %self.config.login_redirect_path, "redirecting to login");
        self.context.navigator.redirect(&self.config.login_redirect_path);
    }
}
