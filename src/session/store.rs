//! Session store: single source of truth for authentication state
//!
//! Holds the bearer token, its issue timestamp, the initial user fragment
//! from login, and the hydrated profile. All mutation goes through this
//! type, guarded by one `RwLock` so that `logout()` is observably atomic:
//! once it returns, `is_authenticated()` is false and `current_profile()`
//! is absent for every subsequent reader.
//!
//! This is also the only component permitted to write the persisted
//! credential keys.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::api::types::UserSummary;
use crate::api::ApiClient;
use crate::error::Result;
use crate::session::persist::{CredentialStore, StoredToken};
use crate::session::profile::Profile;

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// In-memory session state behind the lock.
#[derive(Default)]
struct SessionState {
    token: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    user: Option<UserSummary>,
    profile: Option<Profile>,
}

/// The session store.
///
/// Constructed once per process via [`SessionStore::open`], shared as an
/// `Arc`, and consumed by the hydrator, the expiry monitor, and every
/// command handler that needs identity.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ciseval::session::persist::MemoryCredentials;
/// use ciseval::session::SessionStore;
///
/// let store = SessionStore::open(Arc::new(MemoryCredentials::new()), 24);
/// assert!(!store.is_authenticated());
/// ```
pub struct SessionStore {
    state: RwLock<SessionState>,
    credentials: Arc<dyn CredentialStore>,
    storage_ttl_hours: u64,
}

impl SessionStore {
    /// Open the session store, restoring a persisted session when one
    /// exists.
    ///
    /// A persisted token record found past its storage expiry hint is
    /// discarded (the keys are cleaned up) rather than restored; the hint
    /// is the backstop, the expiry monitor is the active enforcement.
    pub fn open(credentials: Arc<dyn CredentialStore>, storage_ttl_hours: u64) -> Self {
        let mut state = SessionState::default();

        match credentials.load_token() {
            Ok(Some(record)) if record.is_expired() => {
                tracing::info!("Discarding persisted token past its storage expiry hint");
                if let Err(e) = credentials.delete_token() {
                    tracing::warn!("Failed to delete stale token record: {}", e);
                }
                if let Err(e) = credentials.delete_issued_at() {
                    tracing::warn!("Failed to delete stale issue timestamp: {}", e);
                }
            }
            Ok(Some(record)) => {
                state.issued_at = match credentials.load_issued_at() {
                    Ok(at) => at,
                    Err(e) => {
                        tracing::warn!("Failed to load issue timestamp: {}", e);
                        None
                    }
                };
                state.token = Some(record.token);
                tracing::debug!("Restored persisted session");
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to load persisted token: {}", e),
        }

        Self {
            state: RwLock::new(state),
            credentials,
            storage_ttl_hours,
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Authenticate against the remote service.
    ///
    /// On success the returned token and initial user fragment are stored,
    /// the issue timestamp is set to now, and both credential keys are
    /// persisted (the token record carries the storage expiry hint).
    ///
    /// # Errors
    ///
    /// Returns [`CisError::Auth`](crate::error::CisError::Auth) when the
    /// credentials are rejected or the auth endpoint is unreachable. The
    /// store performs no retry.
    pub async fn login(&self, api: &ApiClient, username: &str, password: &str) -> Result<()> {
        let response = api.login(username, password).await?;
        let issued_at = Utc::now();

        {
            let mut state = self.state.write().expect("session lock");
            state.token = Some(response.token.clone());
            state.issued_at = Some(issued_at);
            state.user = response.user;
            state.profile = None;
        }

        let record = StoredToken::new(response.token, self.storage_ttl_hours);
        self.credentials.save_token(&record)?;
        self.credentials.save_issued_at(issued_at)?;

        tracing::info!("Logged in as '{}'", username);
        Ok(())
    }

    /// Clear the session and the persisted credential keys.
    ///
    /// Idempotent. Persistence failures are logged, never propagated, so
    /// a logout cannot itself fail.
    pub fn logout(&self) {
        {
            let mut state = self.state.write().expect("session lock");
            state.token = None;
            state.issued_at = None;
            state.user = None;
            state.profile = None;
        }

        if let Err(e) = self.credentials.delete_token() {
            tracing::warn!("Failed to delete persisted token: {}", e);
        }
        if let Err(e) = self.credentials.delete_issued_at() {
            tracing::warn!("Failed to delete persisted issue timestamp: {}", e);
        }
        tracing::info!("Logged out");
    }

    /// True iff a non-empty token is held.
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .expect("session lock")
            .token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// The current bearer token, if any.
    pub fn current_token(&self) -> Option<String> {
        self.state.read().expect("session lock").token.clone()
    }

    /// The hydrated profile, if any.
    pub fn current_profile(&self) -> Option<Profile> {
        self.state.read().expect("session lock").profile.clone()
    }

    /// The initial user fragment from login, if any.
    pub fn current_user(&self) -> Option<UserSummary> {
        self.state.read().expect("session lock").user.clone()
    }

    /// The token issue timestamp, if any.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().expect("session lock").issued_at
    }

    /// Attach a hydrated profile to the session.
    ///
    /// A profile is only ever attached alongside a token; calling this
    /// with no token held is ignored with a warning, preserving the
    /// invariant that clearing the token also clears the profile.
    pub fn set_profile(&self, profile: Profile) {
        let mut state = self.state.write().expect("session lock");
        if state.token.is_none() {
            tracing::warn!("set_profile called with no token held; ignoring");
            return;
        }
        state.profile = Some(profile);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RawProfile;
    use crate::session::persist::MemoryCredentials;
    use chrono::Duration;

    fn make_store() -> (SessionStore, Arc<MemoryCredentials>) {
        let credentials = Arc::new(MemoryCredentials::new());
        let store = SessionStore::open(credentials.clone(), 24);
        (store, credentials)
    }

    /// Seed the store with a token as if a login had happened, without a
    /// network round-trip.
    fn seed_token(credentials: &MemoryCredentials, token: &str) {
        credentials
            .save_token(&StoredToken::new(token.to_string(), 24))
            .expect("save token");
        credentials
            .save_issued_at(Utc::now())
            .expect("save issued_at");
    }

    // -----------------------------------------------------------------------
    // open()
    // -----------------------------------------------------------------------

    #[test]
    fn test_open_with_empty_storage_is_unauthenticated() {
        let (store, _) = make_store();
        assert!(!store.is_authenticated());
        assert!(store.current_token().is_none());
        assert!(store.current_profile().is_none());
    }

    #[test]
    fn test_open_restores_persisted_session() {
        let credentials = Arc::new(MemoryCredentials::new());
        seed_token(&credentials, "persisted_tok");

        let store = SessionStore::open(credentials, 24);
        assert!(store.is_authenticated());
        assert_eq!(store.current_token().as_deref(), Some("persisted_tok"));
        assert!(store.issued_at().is_some());
    }

    #[test]
    fn test_open_discards_record_past_storage_hint() {
        let credentials = Arc::new(MemoryCredentials::new());
        credentials
            .save_token(&StoredToken {
                token: "stale".to_string(),
                expires_at: Utc::now() - Duration::hours(1),
            })
            .expect("save");
        credentials
            .save_issued_at(Utc::now() - Duration::hours(30))
            .expect("save");

        let store = SessionStore::open(credentials.clone(), 24);
        assert!(!store.is_authenticated());
        // Both keys are cleaned up, not just ignored.
        assert!(credentials.load_token().expect("load").is_none());
        assert!(credentials.load_issued_at().expect("load").is_none());
    }

    // -----------------------------------------------------------------------
    // logout()
    // -----------------------------------------------------------------------

    #[test]
    fn test_logout_clears_state_and_storage() {
        let credentials = Arc::new(MemoryCredentials::new());
        seed_token(&credentials, "tok");
        let store = SessionStore::open(credentials.clone(), 24);
        store.set_profile(RawProfile::default().normalize());
        assert!(store.current_profile().is_some());

        store.logout();

        assert!(!store.is_authenticated());
        assert!(store.current_token().is_none());
        assert!(store.current_profile().is_none());
        assert!(store.issued_at().is_none());
        assert!(credentials.load_token().expect("load").is_none());
        assert!(credentials.load_issued_at().expect("load").is_none());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let (store, _) = make_store();
        store.logout();
        store.logout();
        assert!(!store.is_authenticated());
    }

    // -----------------------------------------------------------------------
    // set_profile()
    // -----------------------------------------------------------------------

    #[test]
    fn test_set_profile_without_token_is_ignored() {
        let (store, _) = make_store();
        store.set_profile(RawProfile::default().normalize());
        assert!(store.current_profile().is_none());
    }

    #[test]
    fn test_set_profile_with_token_attaches() {
        let credentials = Arc::new(MemoryCredentials::new());
        seed_token(&credentials, "tok");
        let store = SessionStore::open(credentials, 24);

        store.set_profile(RawProfile::default().normalize());
        assert!(store.current_profile().is_some());
    }

    // -----------------------------------------------------------------------
    // is_authenticated()
    // -----------------------------------------------------------------------

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let credentials = Arc::new(MemoryCredentials::new());
        credentials
            .save_token(&StoredToken::new(String::new(), 24))
            .expect("save");
        let store = SessionStore::open(credentials, 24);
        assert!(!store.is_authenticated());
    }
}
