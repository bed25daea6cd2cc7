//! API error types

use popspot_domain::DomainError;
use thiserror::Error;

use crate::client::ClientError;
use crate::ports::SessionError;

/// Errors returned by the API wrappers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The input could not be turned into a request.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    /// The request could not be completed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The API answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Status {
        /// Response status.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The session could not be stored.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Returns true if the user has to log in again.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_auth_failure())
    }

    /// Returns true if the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
