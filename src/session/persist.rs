//! Bearer token persistence via OS keyring
//!
//! This module provides durable storage for the session credentials using
//! the operating system's native credential store (Keychain on macOS,
//! Secret Service on Linux, Windows Credential Manager on Windows).
//!
//! Two distinct keys are persisted: the token record (JSON, carrying a
//! storage-level expiry hint) and the issue timestamp consumed by the
//! expiry monitor. The session store is the only writer of either key.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CisError, Result};

// ---------------------------------------------------------------------------
// StoredToken
// ---------------------------------------------------------------------------

/// The persisted bearer token record.
///
/// `expires_at` is the storage-level expiry hint (one day by default),
/// distinct from the in-app one-hour validity window that the expiry
/// monitor enforces actively. A record found past its hint on load is
/// discarded instead of restored.
///
/// # Examples
///
/// ```
/// use ciseval::session::persist::StoredToken;
///
/// let record = StoredToken::new("my_token".to_string(), 24);
/// assert!(!record.is_expired());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// The opaque bearer credential.
    pub token: String,

    /// UTC timestamp at which the stored record stops being restorable.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Build a record expiring `ttl_hours` from now.
    pub fn new(token: String, ttl_hours: u64) -> Self {
        Self {
            token,
            expires_at: Utc::now() + Duration::hours(ttl_hours as i64),
        }
    }

    /// Returns `true` when the storage expiry hint has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Durable storage for the session credentials.
///
/// The session store owns exactly one implementation of this trait and is
/// the only component that writes through it. [`KeyringCredentials`] is
/// the production implementation; [`MemoryCredentials`] backs tests and
/// ephemeral sessions.
pub trait CredentialStore: Send + Sync {
    /// Persist the token record, replacing any previous one.
    fn save_token(&self, record: &StoredToken) -> Result<()>;

    /// Load the token record; `Ok(None)` when nothing is stored.
    fn load_token(&self) -> Result<Option<StoredToken>>;

    /// Delete the token record; no-op when nothing is stored.
    fn delete_token(&self) -> Result<()>;

    /// Persist the token issue timestamp.
    fn save_issued_at(&self, issued_at: DateTime<Utc>) -> Result<()>;

    /// Load the issue timestamp; `Ok(None)` when nothing is stored.
    fn load_issued_at(&self) -> Result<Option<DateTime<Utc>>>;

    /// Delete the issue timestamp; no-op when nothing is stored.
    fn delete_issued_at(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// KeyringCredentials
// ---------------------------------------------------------------------------

/// OS keyring-backed [`CredentialStore`].
///
/// The keyring is stateless; this is a zero-field struct acting as a
/// namespaced accessor. Service names are prefixed with `ciseval-` to
/// avoid collisions with other applications.
pub struct KeyringCredentials;

const TOKEN_SERVICE: &str = "ciseval-auth-token";
const ISSUED_AT_SERVICE: &str = "ciseval-auth-issued";
const ACCOUNT: &str = "cis";

impl KeyringCredentials {
    fn entry(service: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, ACCOUNT)
            .map_err(|e| CisError::Keyring(e).into())
    }

    fn read(service: &str) -> Result<Option<String>> {
        match Self::entry(service)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CisError::Keyring(e).into()),
        }
    }

    fn write(service: &str, value: &str) -> Result<()> {
        Self::entry(service)?
            .set_password(value)
            .map_err(|e| CisError::Keyring(e).into())
    }

    fn remove(service: &str) -> Result<()> {
        match Self::entry(service)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CisError::Keyring(e).into()),
        }
    }
}

impl CredentialStore for KeyringCredentials {
    fn save_token(&self, record: &StoredToken) -> Result<()> {
        let json = serde_json::to_string(record)?;
        Self::write(TOKEN_SERVICE, &json)
    }

    fn load_token(&self) -> Result<Option<StoredToken>> {
        match Self::read(TOKEN_SERVICE)? {
            Some(json) => {
                let record: StoredToken = serde_json::from_str(&json)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn delete_token(&self) -> Result<()> {
        Self::remove(TOKEN_SERVICE)
    }

    fn save_issued_at(&self, issued_at: DateTime<Utc>) -> Result<()> {
        Self::write(ISSUED_AT_SERVICE, &issued_at.to_rfc3339())
    }

    fn load_issued_at(&self) -> Result<Option<DateTime<Utc>>> {
        match Self::read(ISSUED_AT_SERVICE)? {
            Some(value) => {
                let parsed = DateTime::parse_from_rfc3339(&value)
                    .map_err(|e| CisError::Config(format!("corrupt issue timestamp: {}", e)))?;
                Ok(Some(parsed.with_timezone(&Utc)))
            }
            None => Ok(None),
        }
    }

    fn delete_issued_at(&self) -> Result<()> {
        Self::remove(ISSUED_AT_SERVICE)
    }
}

// ---------------------------------------------------------------------------
// MemoryCredentials
// ---------------------------------------------------------------------------

/// In-process [`CredentialStore`] with no durable side effects.
///
/// Used by tests and by ephemeral sessions that must not touch the OS
/// keyring.
#[derive(Default)]
pub struct MemoryCredentials {
    token: std::sync::Mutex<Option<StoredToken>>,
    issued_at: std::sync::Mutex<Option<DateTime<Utc>>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentials {
    fn save_token(&self, record: &StoredToken) -> Result<()> {
        *self.token.lock().expect("credential lock") = Some(record.clone());
        Ok(())
    }

    fn load_token(&self) -> Result<Option<StoredToken>> {
        Ok(self.token.lock().expect("credential lock").clone())
    }

    fn delete_token(&self) -> Result<()> {
        *self.token.lock().expect("credential lock") = None;
        Ok(())
    }

    fn save_issued_at(&self, issued_at: DateTime<Utc>) -> Result<()> {
        *self.issued_at.lock().expect("credential lock") = Some(issued_at);
        Ok(())
    }

    fn load_issued_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(*self.issued_at.lock().expect("credential lock"))
    }

    fn delete_issued_at(&self) -> Result<()> {
        *self.issued_at.lock().expect("credential lock") = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
