//! Navigation port

/// Moves the application to another route.
///
/// Used to send the user to the login entry point when the session
/// cannot be recovered. Must not block.
pub trait Navigator: Send + Sync {
    /// Navigates to `path`.
    fn redirect(&self, path: &str);
}
