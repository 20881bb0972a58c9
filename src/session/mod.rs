//! Session subsystem: authentication state, persistence, hydration, expiry
//!
//! The [`SessionStore`] is the single source of truth for identity. The
//! [`ProfileHydrator`] attaches the normalized profile at most once per
//! token, and the [`ExpiryMonitor`] enforces the validity window by
//! polling. Durable credential storage goes through the
//! [`CredentialStore`](persist::CredentialStore) trait so tests can swap
//! the OS keyring for an in-memory implementation.

pub mod expiry;
pub mod hydrator;
pub mod persist;
pub mod profile;
pub mod store;

pub use expiry::ExpiryMonitor;
pub use hydrator::ProfileHydrator;
pub use profile::{Profile, Role, UNSPECIFIED};
pub use store::SessionStore;
