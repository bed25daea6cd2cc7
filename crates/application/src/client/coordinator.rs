//! Single-flight coordination of token refreshes.
//!
//! The first request to report an authentication failure becomes the
//! refresh owner and receives a [`RefreshGuard`]. Requests failing while
//! the guard is alive are queued; each gets a one-shot receiver resolved
//! with the owner's outcome when the guard settles or is dropped.

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::error::RefreshError;

/// New access token, or why none could be obtained.
pub type RefreshOutcome = Result<String, RefreshError>;

#[derive(Debug, Default)]
struct RefreshState {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Per-client refresh exclusion flag and pending queue.
///
/// The lock is only taken for synchronous transitions and never held
/// across an await point.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// Role assigned to a request that failed authentication.
#[derive(Debug)]
#[must_use]
pub enum Admission<'a> {
    /// No refresh was running; this request performs it.
    Owner(RefreshGuard<'a>),
    /// A refresh is running; await its outcome.
    Queued(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the refresh or joins the queue of the running one.
    pub fn admit(&self) -> Admission<'_> {
        let mut state = self.state.lock();
        if state.in_progress {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            Admission::Queued(rx)
        } else {
            state.in_progress = true;
            Admission::Owner(RefreshGuard {
                coordinator: self,
                obtained: None,
                settled: false,
            })
        }
    }

    /// Returns true while a refresh is outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_progress
    }

    /// Returns the number of requests waiting on the running refresh.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Clears the flag and hands `outcome` to every waiter in queue order.
    fn release(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.in_progress = false;
            std::mem::take(&mut state.waiters)
        };
        let count = waiters.len();
        for waiter in waiters {
            // A dropped receiver means the caller gave up waiting.
            let _ = waiter.send(outcome.clone());
        }
        count
    }
}

/// Ownership of the running refresh.
///
/// Dropping the guard without settling it releases the flag. The queue
/// receives the token recorded with [`RefreshGuard::obtained`], or
/// [`RefreshError::Aborted`] if none was.
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    obtained: Option<String>,
    settled: bool,
}

impl RefreshGuard<'_> {
    /// Records a freshly issued access token before the refresh settles.
    pub fn obtained(&mut self, access_token: &str) {
        self.obtained = Some(access_token.to_string());
    }

    /// Publishes the outcome to the queue and ends the refresh.
    ///
    /// Returns the number of queued requests notified.
    pub fn settle(mut self, outcome: RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.release(&outcome)
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let outcome = self.obtained.take().ok_or(RefreshError::Aborted);
            self.coordinator.release(&outcome);
        }
    }
}
