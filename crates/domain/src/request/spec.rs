//! Request specification type

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Header, Headers, HttpMethod, QueryParams};
use crate::error::{DomainError, DomainResult};

/// How many times a request has already been sent.
///
/// A request is replayed at most once after an authentication failure;
/// the marker travels with the descriptor instead of being patched onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Attempt {
    /// First transmission.
    #[default]
    Initial,
    /// Replay with a refreshed access token.
    Replay,
}

impl Attempt {
    /// Returns true if this request was already replayed once.
    #[must_use]
    pub const fn is_replay(self) -> bool {
        matches!(self, Self::Replay)
    }
}

/// Specification for a single API request.
///
/// The path is relative to the configured API base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Unique identifier, shared by a request and its replay
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API base URL, starting with `/`
    pub path: String,
    /// Query string parameters
    #[serde(default)]
    pub query: QueryParams,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// JSON body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    attempt: Attempt,
}

impl RequestSpec {
    /// Creates a request with the given method and path.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            query: QueryParams::new(),
            headers: Headers::new(),
            body: None,
            attempt: Attempt::Initial,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.set(header);
        self
    }

    /// Serializes `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Returns the attempt marker.
    #[must_use]
    pub const fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// Returns a copy carrying the given bearer token.
    #[must_use]
    pub fn authorized(&self, token: &str) -> Self {
        let mut request = self.clone();
        request.headers.set(Header::bearer(token));
        request
    }

    /// Returns the replay of this request with a refreshed access token.
    #[must_use]
    pub fn replay_with(&self, token: &str) -> Self {
        let mut request = self.authorized(token);
        request.attempt = Attempt::Replay;
        request
    }

    /// Checks that the path can be joined onto the API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, relative, or absolute with a scheme.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.path.starts_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "path must start with '/': {}",
                self.path
            )));
        }
        if self.path.starts_with("//") {
            return Err(DomainError::InvalidPath(format!(
                "path must not be protocol-relative: {}",
                self.path
            )));
        }
        Ok(())
    }
}
