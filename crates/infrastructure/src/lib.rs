//! PopSpot Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod config;
pub mod navigation;
pub mod persistence;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use config::{ConfigError, ConfigLoader, default_session_path};
pub use navigation::{BroadcastNavigator, LoggingNavigator, Redirect};
pub use persistence::FileSessionStore;
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
