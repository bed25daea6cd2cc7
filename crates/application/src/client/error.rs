//! Client error types

use popspot_domain::{DomainError, ResponseSpec};
use thiserror::Error;

use crate::ports::TransportError;

/// Why a token refresh did not produce a new token pair.
///
/// Cloned to every request queued behind the refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// The refresh endpoint could not be reached.
    #[error("refresh request failed: {0}")]
    Transport(#[from] TransportError),

    /// The refresh endpoint answered with a non-success status.
    #[error("refresh rejected with status {status}")]
    Rejected {
        /// Response status.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The refresh response was not a token pair.
    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),

    /// The session was logged out or replaced while the refresh ran.
    #[error("session ended during token refresh")]
    SessionEnded,

    /// The request that owned the refresh was dropped before it settled.
    #[error("token refresh was abandoned")]
    Aborted,
}

/// Errors returned by [`AuthenticatedClient::send`](super::AuthenticatedClient::send).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request descriptor is not valid.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// No response could be obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Authentication failed and could not be recovered.
    ///
    /// Carries the response that triggered the failure.
    #[error("authentication rejected with status {status}")]
    Unauthorized {
        /// Response status.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The access token expired and refreshing it failed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(#[from] RefreshError),
}

impl ClientError {
    /// Builds an `Unauthorized` error from the rejected response.
    #[must_use]
    pub fn unauthorized(response: &ResponseSpec) -> Self {
        Self::Unauthorized {
            status: response.status.as_u16(),
            body: response.text(),
        }
    }

    /// Returns true if the session was dropped because of this error.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::RefreshFailed(_))
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
