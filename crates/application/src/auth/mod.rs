//! Session storage for PopSpot.
//!
//! This module provides the in-memory session store used by tests and
//! as the working copy inside persistent stores.

mod session_store;

pub use session_store::InMemorySessionStore;
