//! Wire shapes for the CIS REST service
//!
//! These structs mirror the JSON payloads exchanged with the remote
//! service. Response shapes are deliberately tolerant: optional and
//! defaulted fields absorb upstream variation, and normalization into
//! canonical records happens at the consuming boundary, not here.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Body of `POST /api/auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response: a bearer token plus an initial user fragment.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

/// Minimal identity fragment returned by the auth endpoint.
///
/// This is not the full profile; the canonical profile is fetched
/// separately and normalized by the hydrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub username: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

// ---------------------------------------------------------------------------
// Profile (raw directory-service shape)
// ---------------------------------------------------------------------------

/// Envelope of `GET /profile`.
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub profile: RawProfile,
}

/// Untyped-ish profile payload from the upstream directory service.
///
/// Every section and every field may be absent. Downstream code must go
/// through [`RawProfile::normalize`](crate::session::profile) rather than
/// consuming this shape directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub general: Option<RawGeneral>,
    #[serde(default)]
    pub contact: Option<RawContact>,
    #[serde(default)]
    pub organization: Option<RawOrganization>,
    #[serde(default)]
    pub meta: Option<RawMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGeneral {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContact {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrganization {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMeta {
    #[serde(rename = "userPrincipalName", default)]
    pub user_principal_name: Option<String>,
    #[serde(rename = "whenCreated", default)]
    pub when_created: Option<String>,
    #[serde(rename = "whenChanged", default)]
    pub when_changed: Option<String>,
    #[serde(rename = "memberOf", default)]
    pub member_of: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Classes and students
// ---------------------------------------------------------------------------

/// Envelope of `GET /api/classes`.
#[derive(Debug, Deserialize)]
pub struct ClassesResponse {
    #[serde(default)]
    pub classes: Vec<ClassSummary>,
}

/// A single class entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassSummary {
    pub id: String,
    pub name: String,
}

/// Envelope of `GET /api/classes/{id}/students`.
#[derive(Debug, Deserialize)]
pub struct StudentsResponse {
    #[serde(default)]
    pub students: Vec<StudentSummary>,
}

/// A single student entry in a class roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Evaluation rubric and submission
// ---------------------------------------------------------------------------

/// Envelope of `GET /api/evaluations/criteria`.
#[derive(Debug, Deserialize)]
pub struct CriteriaResponse {
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

/// A rubric criterion as served by the remote API, in server order.
#[derive(Debug, Clone, Deserialize)]
pub struct Criterion {
    pub id: u32,
    #[serde(default)]
    pub name_kz: String,
    #[serde(default)]
    pub name_ru: String,
    #[serde(default)]
    pub mission_component: String,
    #[serde(default)]
    pub description_kz: String,
    #[serde(default)]
    pub description_ru: String,
    #[serde(default)]
    pub max_score: u32,
    #[serde(default)]
    pub category: String,
}

/// One scored criterion inside an evaluation submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationCriterion {
    pub criterion_id: u32,
    pub criterion_name_kz: String,
    pub score: u8,
    pub comment_kz: String,
}

/// Body of `POST /api/evaluations/create`.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRequest {
    pub student_id: String,
    pub student_name_kz: String,
    pub student_name_ru: String,
    pub class_year: String,
    pub overall_comment_kz: String,
    pub criteria: Vec<EvaluationCriterion>,
}

/// Confirmation returned by the evaluation-creation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationReceipt {
    pub message: String,
    pub evaluation_id: u64,
    pub total_score: u32,
    pub percentage: f64,
}

// ---------------------------------------------------------------------------
// My evaluations (read-only display data)
// ---------------------------------------------------------------------------

/// Envelope of `GET /api/evaluations/my-evaluations`.
#[derive(Debug, Deserialize)]
pub struct EvaluationsResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub evaluations: Vec<EvaluationRecord>,
}

/// A stored evaluation with its per-criterion details.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationRecord {
    pub id: u64,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub student_name_kz: String,
    #[serde(default)]
    pub student_name_ru: String,
    #[serde(default)]
    pub class_year: String,
    #[serde(default)]
    pub evaluator_username: String,
    #[serde(default)]
    pub evaluator_name: String,
    #[serde(default)]
    pub total_score: u32,
    #[serde(default)]
    pub max_possible_score: u32,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub overall_comment_kz: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub details: Vec<EvaluationDetail>,
}

/// Per-criterion detail row of a stored evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationDetail {
    pub criterion_id: u32,
    #[serde(default)]
    pub criterion_name_kz: String,
    #[serde(default)]
    pub criterion_name_ru: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub max_score: u32,
    #[serde(default)]
    pub comment_kz: Option<String>,
    #[serde(default)]
    pub comment_ru: Option<String>,
}

/// Error body some endpoints return alongside 4xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
