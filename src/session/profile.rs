//! Canonical user profile and boundary normalization
//!
//! The upstream directory service returns a partial, nested payload in
//! which any section or field may be missing. Normalization happens once,
//! here, at the boundary: every textual field of the canonical [`Profile`]
//! is filled with the explicit [`UNSPECIFIED`] sentinel rather than left
//! absent, so downstream code never deals with optional strings. The only
//! exception is the avatar reference, whose absence is meaningful.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::types::RawProfile;

/// Sentinel value for profile fields the directory service did not supply.
pub const UNSPECIFIED: &str = "unspecified";

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// User role as reported by the directory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Evaluator,
    Admin,
    /// Any role label this client does not recognize.
    Unknown,
}

impl Role {
    /// Parse a role label case-insensitively; unrecognized labels map to
    /// [`Role::Unknown`] instead of failing.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "teacher" => Role::Teacher,
            "evaluator" => Role::Evaluator,
            "admin" => Role::Admin,
            _ => Role::Unknown,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::Teacher => "teacher",
            Role::Evaluator => "evaluator",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Normalized user profile.
///
/// Read-only projection owned by the session; only the profile hydrator
/// attaches it and only `logout()` removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    // Identity
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub description: String,
    /// Avatar reference; `None` means "render the default avatar".
    pub avatar: Option<String>,

    // Contact
    pub email: String,
    pub mobile: String,

    // Organization
    pub title: String,
    pub department: String,
    pub company: String,

    // Metadata
    pub principal_name: String,
    pub when_created: String,
    pub when_changed: String,
    pub member_of: Vec<String>,
}

impl RawProfile {
    /// Normalize the raw directory payload into a canonical [`Profile`].
    ///
    /// Missing fields are replaced with the [`UNSPECIFIED`] sentinel,
    /// the role label is parsed into [`Role`], group memberships default
    /// to empty, and directory audit timestamps are reformatted to
    /// RFC 3339 where they parse.
    pub fn normalize(self) -> Profile {
        let general = self.general.unwrap_or_default();
        let contact = self.contact.unwrap_or_default();
        let organization = self.organization.unwrap_or_default();
        let meta = self.meta.unwrap_or_default();

        Profile {
            username: or_unspecified(general.username),
            display_name: or_unspecified(general.display_name),
            role: general
                .role
                .as_deref()
                .map(Role::from_label)
                .unwrap_or(Role::Unknown),
            description: or_unspecified(general.description),
            avatar: general.avatar.filter(|a| !a.is_empty()),
            email: or_unspecified(contact.email),
            mobile: or_unspecified(contact.mobile),
            title: or_unspecified(organization.title),
            department: or_unspecified(organization.department),
            company: or_unspecified(organization.company),
            principal_name: or_unspecified(meta.user_principal_name),
            when_created: normalize_timestamp(meta.when_created),
            when_changed: normalize_timestamp(meta.when_changed),
            member_of: meta.member_of.unwrap_or_default(),
        }
    }
}

/// Replace a missing or empty field with the sentinel.
fn or_unspecified(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => UNSPECIFIED.to_string(),
    }
}

/// Reformat a directory `YYYYMMDDhhmmss.0Z` audit timestamp as RFC 3339.
///
/// Values that do not match the directory format are passed through
/// verbatim; absent values become the sentinel.
fn normalize_timestamp(value: Option<String>) -> String {
    let raw = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return UNSPECIFIED.to_string(),
    };

    let digits: &str = raw.split('.').next().unwrap_or(&raw);
    if digits.len() == 14 {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S") {
            return parsed.and_utc().to_rfc3339();
        }
    }
    raw
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
