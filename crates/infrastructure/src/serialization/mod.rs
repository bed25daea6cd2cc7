//! JSON serialization for files owned by the client.
//!
//! Output is 2-space indented UTF-8 with a trailing newline.

mod json;

pub use json::*;
