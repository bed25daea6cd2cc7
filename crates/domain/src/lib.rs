//! PopSpot Domain - Core business types
//!
//! This crate defines the domain model for the PopSpot API client:
//! request/response descriptors, the authenticated session, exhibition
//! listings and the client configuration. All types here are pure Rust
//! with no I/O dependencies.

pub mod config;
pub mod error;
pub mod exhibition;
pub mod request;
pub mod response;
pub mod session;

pub use config::ClientConfig;
pub use error::{DomainError, DomainResult};
pub use exhibition::{EventKind, Exhibition, ExhibitionQuery, MapBounds, WishlistItem};
pub use request::{Attempt, Header, Headers, HttpMethod, QueryParams, RequestSpec};
pub use response::{ResponseSpec, StatusCode};
pub use session::{LoginResponse, Session, TokenPair, UserProfile, token_preview};
