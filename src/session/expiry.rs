//! Expiry monitor: polling enforcement of the token validity window
//!
//! A recurring background task computes the token age from the issue
//! timestamp on a fixed interval and forces a logout once the age exceeds
//! the validity window. This is pure polling, not event-driven. The task
//! is cancellable and at most one is active per monitor; re-initialization
//! never stacks a second timer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::session::store::SessionStore;

// ---------------------------------------------------------------------------
// ExpiryMonitor
// ---------------------------------------------------------------------------

/// Owns the recurring expiry check for one session store.
///
/// `check_now()` is the pure check, exposed so tests (and one-shot
/// commands) can enforce expiry without waiting on the timer.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use ciseval::session::persist::MemoryCredentials;
/// use ciseval::session::{ExpiryMonitor, SessionStore};
///
/// let store = Arc::new(SessionStore::open(Arc::new(MemoryCredentials::new()), 24));
/// let monitor = ExpiryMonitor::new(
///     store,
///     Duration::from_secs(3600),
///     Duration::from_secs(60),
/// );
/// monitor.check_now();
/// ```
pub struct ExpiryMonitor {
    store: Arc<SessionStore>,
    validity: Duration,
    poll_interval: Duration,
    task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl ExpiryMonitor {
    /// Create a monitor with the given validity window and poll interval.
    pub fn new(store: Arc<SessionStore>, validity: Duration, poll_interval: Duration) -> Self {
        Self {
            store,
            validity,
            poll_interval,
            task: Mutex::new(None),
        }
    }

    /// Run one expiry check immediately.
    ///
    /// Returns `true` when the check expired the session.
    pub fn check_now(&self) -> bool {
        let issued_at = match self.store.issued_at() {
            Some(at) if self.store.is_authenticated() => at,
            _ => return false,
        };

        let age = (Utc::now() - issued_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if age > self.validity {
            tracing::info!(
                "Token exceeded validity window ({}s > {}s); logging out",
                age.as_secs(),
                self.validity.as_secs()
            );
            // logout() also deletes the persisted issue-timestamp key.
            self.store.logout();
            return true;
        }
        false
    }

    /// Start the recurring background check.
    ///
    /// A no-op when a timer is already active, so re-initialization of the
    /// owning context never duplicates the task.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().expect("monitor lock");
        if let Some((_, handle)) = task.as_ref() {
            if !handle.is_finished() {
                tracing::debug!("Expiry monitor already running; not starting a second timer");
                return;
            }
        }

        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.poll_interval);
            // The first tick fires immediately; skip it so the cadence
            // matches a plain recurring timer.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        monitor.check_now();
                    }
                }
            }
        });

        *task = Some((cancel, handle));
        tracing::debug!(
            "Expiry monitor started (window {}s, poll {}s)",
            self.validity.as_secs(),
            self.poll_interval.as_secs()
        );
    }

    /// Stop the background check, if running. Idempotent.
    pub fn stop(&self) {
        if let Some((cancel, handle)) = self.task.lock().expect("monitor lock").take() {
            cancel.cancel();
            handle.abort();
            tracing::debug!("Expiry monitor stopped");
        }
    }

    /// True when the background task is currently active.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .expect("monitor lock")
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }
}

impl Drop for ExpiryMonitor {
    fn drop(&mut self) {
        if let Some((cancel, handle)) = self.task.lock().expect("monitor lock").take() {
            cancel.cancel();
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::persist::{CredentialStore, MemoryCredentials, StoredToken};
    use chrono::Duration as ChronoDuration;

    fn store_with_token_issued(age: ChronoDuration) -> Arc<SessionStore> {
        let credentials = Arc::new(MemoryCredentials::new());
        credentials
            .save_token(&StoredToken::new("tok".to_string(), 48))
            .expect("save");
        credentials
            .save_issued_at(Utc::now() - age)
            .expect("save");
        Arc::new(SessionStore::open(credentials, 48))
    }

    fn make_monitor(store: Arc<SessionStore>) -> Arc<ExpiryMonitor> {
        Arc::new(ExpiryMonitor::new(
            store,
            Duration::from_secs(3600),
            Duration::from_secs(60),
        ))
    }

    // -----------------------------------------------------------------------
    // check_now()
    // -----------------------------------------------------------------------

    #[test]
    fn test_check_now_keeps_fresh_token() {
        let store = store_with_token_issued(ChronoDuration::minutes(30));
        let monitor = make_monitor(store.clone());
        assert!(!monitor.check_now());
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_check_now_expires_old_token() {
        let store = store_with_token_issued(ChronoDuration::minutes(61));
        let monitor = make_monitor(store.clone());
        assert!(monitor.check_now());
        assert!(!store.is_authenticated());
        assert!(store.current_profile().is_none());
    }

    #[test]
    fn test_check_now_noop_when_unauthenticated() {
        let store = Arc::new(SessionStore::open(Arc::new(MemoryCredentials::new()), 24));
        let monitor = make_monitor(store);
        assert!(!monitor.check_now());
    }

    // -----------------------------------------------------------------------
    // start()/stop() lifecycle
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_start_is_single_shot() {
        let store = store_with_token_issued(ChronoDuration::minutes(1));
        let monitor = make_monitor(store);

        monitor.start();
        assert!(monitor.is_running());
        // A second start must not replace or duplicate the timer.
        monitor.start();
        assert!(monitor.is_running());

        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let store = store_with_token_issued(ChronoDuration::minutes(1));
        let monitor = make_monitor(store);
        monitor.start();
        monitor.stop();
        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_expires_session_after_validity_window() {
        let store = store_with_token_issued(ChronoDuration::minutes(61));
        let monitor = Arc::new(ExpiryMonitor::new(
            store.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(60),
        ));
        monitor.start();
        assert!(store.is_authenticated());
        // Let the spawned task register its timer before advancing.
        tokio::task::yield_now().await;

        // Advance past one poll interval of simulated time; the tick runs
        // the check and forces the logout with no explicit call.
        tokio::time::advance(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert!(!store.is_authenticated());
        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_timer_no_longer_checks() {
        let store = store_with_token_issued(ChronoDuration::minutes(61));
        let monitor = make_monitor(store.clone());
        monitor.start();
        monitor.stop();

        tokio::time::advance(Duration::from_secs(120)).await;
        tokio::task::yield_now().await;

        // The session outlives the validity window because nothing polls.
        assert!(store.is_authenticated());
    }
}
