//! HTTP client for the CIS REST service
//!
//! This module wraps a shared `reqwest` client and exposes one method per
//! consumed endpoint. Every call site translates transport and status
//! failures into the small [`CisError`] taxonomy; no error leaves this
//! module untranslated and nothing here retries.
//!
//! List/detail fetches take a [`CancellationToken`] so a consuming view
//! that is torn down before the response arrives can abort the request
//! instead of applying stale state.

pub mod types;

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{CisError, Result};

pub use types::{
    ApiErrorBody, ClassSummary, CriteriaResponse, Criterion, EvaluationCriterion,
    EvaluationReceipt, EvaluationRecord, EvaluationRequest, EvaluationsResponse, LoginRequest,
    LoginResponse, ProfileResponse, RawProfile, StudentSummary, UserSummary,
};

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Client for the remote CIS service.
///
/// Cheap to clone would be unnecessary; one instance is shared by
/// reference across the session store, hydrator, and command handlers.
///
/// # Examples
///
/// ```no_run
/// use ciseval::api::ApiClient;
/// use ciseval::config::ApiConfig;
///
/// # fn example() -> ciseval::error::Result<()> {
/// let client = ApiClient::new(&ApiConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CisError::Config`] when the base URL does not parse and
    /// [`CisError::Api`] when HTTP client initialization fails.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CisError::Config(format!("invalid api.base_url: {}", e)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ciseval/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CisError::Api(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("Initialized API client: base_url={}", base_url);
        Ok(Self { http, base_url })
    }

    /// Resolve an endpoint path against the configured base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CisError::Config(format!("invalid endpoint path '{}': {}", path, e)).into())
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    /// `POST /api/auth/login` with username and password.
    ///
    /// # Errors
    ///
    /// Returns [`CisError::Auth`] when the credentials are rejected or the
    /// auth endpoint is unreachable. No retry is performed.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let url = self.endpoint("/api/auth/login")?;
        tracing::debug!("Logging in as '{}'", username);

        let response = self
            .http
            .post(url)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .map_err(|e| CisError::Auth(format!("auth endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Login rejected for '{}': {}", username, status);
            return Err(CisError::Auth(format!("login rejected ({})", status)).into());
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| CisError::Auth(format!("malformed login response: {}", e)))?;
        Ok(login)
    }

    // -----------------------------------------------------------------------
    // Profile
    // -----------------------------------------------------------------------

    /// `GET /profile` with bearer auth.
    ///
    /// Returns the raw partial profile shape; normalization happens in the
    /// session layer.
    pub async fn fetch_profile(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<RawProfile> {
        let url = self.endpoint("/profile")?;
        let envelope: ProfileResponse = cancellable(cancel, self.get_json(url, token)).await?;
        Ok(envelope.profile)
    }

    // -----------------------------------------------------------------------
    // Classes and students
    // -----------------------------------------------------------------------

    /// `GET /api/classes` with bearer auth.
    pub async fn fetch_classes(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ClassSummary>> {
        let url = self.endpoint("/api/classes")?;
        let envelope: types::ClassesResponse = cancellable(cancel, self.get_json(url, token)).await?;
        Ok(envelope.classes)
    }

    /// `GET /api/classes/{class_id}/students` with bearer auth.
    pub async fn fetch_students(
        &self,
        token: &str,
        class_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StudentSummary>> {
        let url = self.endpoint(&format!("/api/classes/{}/students", class_id))?;
        let envelope: types::StudentsResponse =
            cancellable(cancel, self.get_json(url, token)).await?;
        Ok(envelope.students)
    }

    // -----------------------------------------------------------------------
    // Evaluations
    // -----------------------------------------------------------------------

    /// `GET /api/evaluations/criteria` with bearer auth.
    ///
    /// The rubric form requires exactly seven entries; the count is
    /// validated by the form state machine, not here.
    pub async fn fetch_criteria(&self, token: &str) -> Result<Vec<Criterion>> {
        let url = self.endpoint("/api/evaluations/criteria")?;
        let envelope: CriteriaResponse = self.get_json(url, token).await?;
        Ok(envelope.criteria)
    }

    /// `POST /api/evaluations/create` with bearer auth and the full draft.
    pub async fn create_evaluation(
        &self,
        token: &str,
        request: &EvaluationRequest,
    ) -> Result<EvaluationReceipt> {
        let url = self.endpoint("/api/evaluations/create")?;
        tracing::debug!(
            "Submitting evaluation for student '{}' ({} criteria)",
            request.student_id,
            request.criteria.len()
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| CisError::Api(format!("evaluation endpoint unreachable: {}", e)))?;

        let response = check_status(response).await?;
        let receipt: EvaluationReceipt = response.json().await.map_err(CisError::Http)?;
        Ok(receipt)
    }

    /// `GET /api/evaluations/my-evaluations` with bearer auth.
    pub async fn fetch_my_evaluations(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<EvaluationsResponse> {
        let url = self.endpoint("/api/evaluations/my-evaluations")?;
        cancellable(cancel, self.get_json(url, token)).await
    }

    // -----------------------------------------------------------------------
    // Statistics (read-only display data)
    // -----------------------------------------------------------------------

    /// `GET /api/evaluations/statistics/summary` with bearer auth.
    ///
    /// The summary shape varies by deployment, so it is surfaced as loose
    /// JSON for display.
    pub async fn fetch_statistics_summary(&self, token: &str) -> Result<serde_json::Value> {
        let url = self.endpoint("/api/evaluations/statistics/summary")?;
        self.get_json(url, token).await
    }

    /// `GET /api/evaluations/statistics/classes` with bearer auth.
    pub async fn fetch_statistics_classes(&self, token: &str) -> Result<serde_json::Value> {
        let url = self.endpoint("/api/evaluations/statistics/classes")?;
        self.get_json(url, token).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Authorized GET returning the JSON-decoded body.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, token: &str) -> Result<T> {
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Request to {} failed: {}", url, e);
                CisError::Api(format!("service unreachable: {}", e))
            })?;

        let response = check_status(response).await?;
        let body: T = response.json().await.map_err(CisError::Http)?;
        Ok(body)
    }
}

/// Translate a non-success HTTP status into the error taxonomy.
///
/// 401 maps to [`CisError::SessionExpired`] so the session layer can force
/// a logout; everything else becomes a user-facing [`CisError::Api`]
/// message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error = match status.as_u16() {
        401 => CisError::SessionExpired,
        403 => CisError::Api("access denied".to_string()),
        400 => {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            CisError::Api(
                body.error
                    .unwrap_or_else(|| "invalid request".to_string()),
            )
        }
        500..=599 => CisError::Api("server error".to_string()),
        _ => CisError::Api(format!("unexpected status {}", status)),
    };
    tracing::warn!("Request failed: {} -> {}", status, error);
    Err(error.into())
}

/// Race a fetch against its cancellation token.
///
/// The token is also checked after completion so a response that arrives
/// in the same poll as the cancellation is still discarded rather than
/// applied to a torn-down view.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        _ = cancel.cancelled() => Err(CisError::Cancelled.into()),
        result = fut => {
            if cancel.is_cancelled() {
                Err(CisError::Cancelled.into())
            } else {
                result
            }
        }
    }
}
