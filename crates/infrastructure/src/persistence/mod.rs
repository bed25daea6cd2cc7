//! Persistence adapters

mod file_session_store;

pub use file_session_store::FileSessionStore;
