//! CISEval - client library for the CIS evaluation platform
//!
//! This library provides the core functionality of the CISEval client:
//! session lifecycle, profile hydration, expiry enforcement, view
//! composition, the rubric evaluation form, and the HTTP client over the
//! remote CIS REST service.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: session store, credential persistence, hydration, expiry
//! - `api`: HTTP client and wire shapes for the remote service
//! - `evaluation`: the seven-criterion rubric form state machine
//! - `view`: route table and pure view composition
//! - `roster`: class list ordering
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ciseval::session::persist::MemoryCredentials;
//! use ciseval::session::SessionStore;
//!
//! let store = SessionStore::open(Arc::new(MemoryCredentials::new()), 24);
//! assert!(!store.is_authenticated());
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod roster;
pub mod session;
pub mod view;

// Re-export commonly used types
pub use api::ApiClient;
pub use config::Config;
pub use error::{CisError, Result};
pub use evaluation::{EvaluationForm, FormState};
pub use session::{ExpiryMonitor, Profile, ProfileHydrator, SessionStore};
pub use view::{compose_view, ViewDecision};
