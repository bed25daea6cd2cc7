//! Authenticated HTTP client.
//!
//! Every request goes out with the current access token. When the API
//! answers with an authentication failure, one request refreshes the token
//! pair while every other failing request waits for the outcome; all of
//! them are then replayed once with the new token, or rejected together.

mod authenticated;
mod coordinator;
mod error;

pub use authenticated::{AuthenticatedClient, ClientContext};
pub use coordinator::{Admission, RefreshCoordinator, RefreshGuard, RefreshOutcome};
pub use error::{ClientError, ClientResult, RefreshError};
