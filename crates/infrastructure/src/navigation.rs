//! Navigator adapters.
//!
//! The client only asks to "go to the login page"; what that means depends
//! on the host. A CLI logs it, an embedding UI subscribes to redirects.

use popspot_application::Navigator;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// A navigation request emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Application route to open.
    pub path: String,
}

/// Navigator that reports redirects through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn redirect(&self, path: &str) {
        warn!(path, "session ended, login required");
    }
}

/// Navigator that broadcasts redirects to any number of subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastNavigator {
    sender: broadcast::Sender<Redirect>,
}

impl BroadcastNavigator {
    /// Creates a navigator buffering up to `capacity` undelivered redirects.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to future redirects.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Redirect> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNavigator {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Navigator for BroadcastNavigator {
    fn redirect(&self, path: &str) {
        let redirect = Redirect {
            path: path.to_string(),
        };
        if self.sender.send(redirect).is_err() {
            info!(path, "redirect dropped, no subscribers");
        }
    }
}
