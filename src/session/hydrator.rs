//! Profile hydration: fetch and attach the profile at most once per token
//!
//! Hydration is an explicit idempotent operation keyed by token identity:
//! re-invoking it after a success, a failure, or while a fetch for the
//! same token is still in flight naturally no-ops. A 401 from the profile
//! endpoint forces a logout so the session never sits in an
//! authenticated-but-invalid state; any other failure is logged and
//! swallowed because hydration is background work that must not interrupt
//! the primary view.

use std::collections::HashSet;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::error::{CisError, Result};
use crate::session::store::SessionStore;

// ---------------------------------------------------------------------------
// ProfileHydrator
// ---------------------------------------------------------------------------

/// Hydrates the session profile from the remote profile endpoint.
///
/// The attempted-token set doubles as the in-flight guard: a token is
/// marked before the fetch starts, so duplicate concurrent calls for the
/// same token return immediately.
#[derive(Default)]
pub struct ProfileHydrator {
    attempted: Mutex<HashSet<String>>,
}

impl ProfileHydrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and attach the profile when the session needs one.
    ///
    /// No-ops when the session is unauthenticated, already hydrated, or
    /// this token value has already been attempted.
    ///
    /// # Errors
    ///
    /// Never propagates fetch failures; the only observable effect of a
    /// 401 is the forced logout.
    pub async fn hydrate(&self, store: &SessionStore, api: &ApiClient) -> Result<()> {
        let token = match store.current_token() {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(()),
        };
        if store.current_profile().is_some() {
            return Ok(());
        }

        // Mark before fetching so a concurrent call for the same token
        // no-ops instead of firing a duplicate request.
        {
            let mut attempted = self.attempted.lock().expect("hydrator lock");
            if !attempted.insert(token.clone()) {
                tracing::debug!("Hydration already attempted for this token; skipping");
                return Ok(());
            }
        }

        let cancel = CancellationToken::new();
        match api.fetch_profile(&token, &cancel).await {
            Ok(raw) => {
                store.set_profile(raw.normalize());
                tracing::debug!("Profile hydrated");
            }
            Err(e) => match e.downcast_ref::<CisError>() {
                Some(cis) if cis.is_session_expired() => {
                    tracing::warn!("Profile fetch returned 401; forcing logout");
                    store.logout();
                }
                _ => {
                    tracing::warn!("Profile hydration failed: {}", e);
                }
            },
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::session::persist::{CredentialStore, MemoryCredentials, StoredToken};
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_api(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base.to_string(),
            timeout_secs: 5,
        })
        .expect("client")
    }

    fn make_store(token: &str) -> SessionStore {
        let credentials = Arc::new(MemoryCredentials::new());
        credentials
            .save_token(&StoredToken::new(token.to_string(), 24))
            .expect("save");
        credentials
            .save_issued_at(chrono::Utc::now())
            .expect("save");
        SessionStore::open(credentials, 24)
    }

    fn profile_body() -> serde_json::Value {
        serde_json::json!({
            "profile": {
                "general": {"displayName": "Aidos K.", "role": "teacher"},
                "contact": {"email": "aidos@school.kz"}
            }
        })
    }

    #[tokio::test]
    async fn test_hydrate_attaches_normalized_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .and(header("Authorization", "Bearer tok1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(1)
            .mount(&server)
            .await;

        let store = make_store("tok1");
        let api = make_api(&server.uri());
        let hydrator = ProfileHydrator::new();

        hydrator.hydrate(&store, &api).await.expect("hydrate");

        let profile = store.current_profile().expect("hydrated");
        assert_eq!(profile.display_name, "Aidos K.");
    }

    #[tokio::test]
    async fn test_hydrate_fires_at_most_once_per_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let store = make_store("tok1");
        let api = make_api(&server.uri());
        let hydrator = ProfileHydrator::new();

        // First attempt fails with a server error and is swallowed; the
        // second must not re-fire for the same token.
        hydrator.hydrate(&store, &api).await.expect("first");
        hydrator.hydrate(&store, &api).await.expect("second");

        assert!(store.current_profile().is_none());
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_hydrate_on_401_forces_logout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let store = make_store("tok1");
        let api = make_api(&server.uri());
        let hydrator = ProfileHydrator::new();

        hydrator.hydrate(&store, &api).await.expect("hydrate");

        assert!(!store.is_authenticated());
        assert!(store.current_profile().is_none());
    }

    #[tokio::test]
    async fn test_hydrate_noop_when_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(0)
            .mount(&server)
            .await;

        let store = SessionStore::open(Arc::new(MemoryCredentials::new()), 24);
        let api = make_api(&server.uri());
        let hydrator = ProfileHydrator::new();

        hydrator.hydrate(&store, &api).await.expect("hydrate");
        assert!(store.current_profile().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_hydrate_issues_single_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(profile_body())
                    .set_delay(std::time::Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(make_store("tok1"));
        let api = Arc::new(make_api(&server.uri()));
        let hydrator = Arc::new(ProfileHydrator::new());

        let a = {
            let (h, s, c) = (hydrator.clone(), store.clone(), api.clone());
            tokio::spawn(async move { h.hydrate(&s, &c).await })
        };
        let b = {
            let (h, s, c) = (hydrator.clone(), store.clone(), api.clone());
            tokio::spawn(async move { h.hydrate(&s, &c).await })
        };
        a.await.expect("join").expect("hydrate");
        b.await.expect("join").expect("hydrate");

        assert!(store.current_profile().is_some());
    }

    #[tokio::test]
    async fn test_new_token_hydrates_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(2)
            .mount(&server)
            .await;

        let api = make_api(&server.uri());
        let hydrator = ProfileHydrator::new();

        let first = make_store("tok1");
        hydrator.hydrate(&first, &api).await.expect("first token");
        assert!(first.current_profile().is_some());

        // A distinct token value is a fresh hydration key.
        let second = make_store("tok2");
        hydrator.hydrate(&second, &api).await.expect("second token");
        assert!(second.current_profile().is_some());
    }
}
