//! PopSpot Application - Ports, session handling and API use cases
//!
//! This crate defines the application layer with:
//! - Port traits (transport, session store, navigation)
//! - The authenticated client and its single-flight token refresh
//! - Typed wrappers over the PopSpot REST API

pub mod api;
pub mod auth;
pub mod client;
pub mod ports;

pub use api::{ApiError, ApiResult, AuthApi, ExhibitionApi, WishlistApi};
pub use auth::InMemorySessionStore;
pub use client::{AuthenticatedClient, ClientContext, ClientError, ClientResult, RefreshError};
pub use ports::{HttpTransport, Navigator, SessionError, SessionStore, TransportError};
