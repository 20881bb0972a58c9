//! Evaluation form state machine
//!
//! Drives the fixed-shape rubric form: `Loading` while the criteria are
//! fetched, `Editing` while the user scores and comments, `Submitting`
//! while the creation request is in flight, and a terminal `Submitted` on
//! success. A failed submission drops back to `Editing` with the error
//! surfaced and all user input preserved.
//!
//! The rubric has exactly [`REQUIRED_CRITERIA`] criteria, each scored in
//! {1, 2, 3}. Submission is refused locally, with no network call, when
//! the identifying fields are empty or the criteria count is wrong.

use std::time::Duration;

use crate::api::types::{Criterion, EvaluationCriterion, EvaluationReceipt, EvaluationRequest};
use crate::api::ApiClient;
use crate::error::{CisError, Result};

/// The rubric always has exactly this many criteria.
pub const REQUIRED_CRITERIA: usize = 7;

/// Lowest assignable criterion score.
pub const MIN_SCORE: u8 = 1;
/// Highest assignable criterion score.
pub const MAX_SCORE: u8 = 3;

/// How long the server's confirmation message stays on screen before the
/// draft is discarded and navigation returns to the class roster.
pub const SUCCESS_DISPLAY_WINDOW: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// State and input types
// ---------------------------------------------------------------------------

/// Lifecycle state of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Criteria are being fetched.
    Loading,
    /// Criteria populated; the user is interacting.
    Editing,
    /// Creation request in flight.
    Submitting,
    /// Terminal success, carrying the server confirmation message.
    Submitted { message: String },
}

/// Keyboard input applied to a criterion score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKey {
    /// Left arrow: decrement, never below [`MIN_SCORE`].
    Left,
    /// Right arrow: increment, never above [`MAX_SCORE`].
    Right,
}

/// One editable rubric entry, in server-provided order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionEntry {
    pub criterion_id: u32,
    pub criterion_name: String,
    pub score: u8,
    pub comment: String,
}

// ---------------------------------------------------------------------------
// EvaluationForm
// ---------------------------------------------------------------------------

/// The evaluation draft plus its state machine.
///
/// The identifying context (`student_id`, both name variants,
/// `class_year`) is supplied at construction and immutable for the
/// draft's lifetime; the draft itself is discarded by dropping the form
/// after a successful submission or on navigation away.
pub struct EvaluationForm {
    student_id: String,
    student_name_kz: String,
    student_name_ru: String,
    class_year: String,
    overall_comment: String,
    criteria: Vec<CriterionEntry>,
    state: FormState,
    error: Option<String>,
}

impl EvaluationForm {
    /// Create a form in `Loading` state for the given student context.
    pub fn new(
        student_id: impl Into<String>,
        student_name_kz: impl Into<String>,
        student_name_ru: impl Into<String>,
        class_year: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            student_name_kz: student_name_kz.into(),
            student_name_ru: student_name_ru.into(),
            class_year: class_year.into(),
            overall_comment: String::new(),
            criteria: Vec::new(),
            state: FormState::Loading,
            error: None,
        }
    }

    /// Enter `Editing` with the fetched criteria.
    ///
    /// Each criterion is seeded with the default score of [`MIN_SCORE`]
    /// and an empty comment, preserving server order.
    pub fn begin_editing(&mut self, criteria: Vec<Criterion>) {
        self.criteria = criteria
            .into_iter()
            .map(|c| CriterionEntry {
                criterion_id: c.id,
                criterion_name: c.name_kz,
                score: MIN_SCORE,
                comment: String::new(),
            })
            .collect();
        self.state = FormState::Editing;
    }

    // -----------------------------------------------------------------------
    // Editing operations
    // -----------------------------------------------------------------------

    /// Set a criterion score, clamped into `[MIN_SCORE, MAX_SCORE]`.
    ///
    /// Out-of-range indices are ignored.
    pub fn update_score(&mut self, index: usize, score: u8) {
        if let Some(entry) = self.criteria.get_mut(index) {
            entry.score = score.clamp(MIN_SCORE, MAX_SCORE);
        }
    }

    /// Replace a criterion comment verbatim; no validation.
    pub fn update_comment(&mut self, index: usize, text: impl Into<String>) {
        if let Some(entry) = self.criteria.get_mut(index) {
            entry.comment = text.into();
        }
    }

    /// Replace the overall comment verbatim.
    pub fn set_overall_comment(&mut self, text: impl Into<String>) {
        self.overall_comment = text.into();
    }

    /// Apply an arrow-key press to a criterion score.
    pub fn apply_key(&mut self, index: usize, key: ScoreKey) {
        let Some(entry) = self.criteria.get(index) else {
            return;
        };
        let score = match key {
            ScoreKey::Left => entry.score.saturating_sub(1).max(MIN_SCORE),
            ScoreKey::Right => (entry.score + 1).min(MAX_SCORE),
        };
        self.update_score(index, score);
    }

    /// Compute a score from a pointer click at `relative_x` across the
    /// score bar (0.0 = left edge, 1.0 = right edge): `ceil(x * 3)`
    /// clamped into `[1, 3]`.
    pub fn score_from_click(relative_x: f64) -> u8 {
        let raw = (relative_x * MAX_SCORE as f64).ceil();
        (raw as i64).clamp(MIN_SCORE as i64, MAX_SCORE as i64) as u8
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Check the submission preconditions without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`CisError::Validation`] when an identifying field is empty
    /// or the criteria count differs from [`REQUIRED_CRITERIA`].
    pub fn validate(&self) -> Result<()> {
        if self.student_id.is_empty() || self.student_name_kz.is_empty() || self.class_year.is_empty()
        {
            return Err(CisError::Validation(
                "student id, name, and class year are required".to_string(),
            )
            .into());
        }
        if self.criteria.len() != REQUIRED_CRITERIA {
            return Err(CisError::Validation(format!(
                "exactly {} rubric criteria are required, got {}",
                REQUIRED_CRITERIA,
                self.criteria.len()
            ))
            .into());
        }
        Ok(())
    }

    /// Submit the draft to the evaluation-creation endpoint.
    ///
    /// Precondition violations fail locally with zero network calls.
    /// Success transitions to `Submitted` and returns the receipt; the
    /// caller displays the confirmation for [`SUCCESS_DISPLAY_WINDOW`]
    /// and then discards the form. Failure returns to `Editing` with the
    /// server-provided error text surfaced and user input intact.
    pub async fn submit(&mut self, api: &ApiClient, token: &str) -> Result<EvaluationReceipt> {
        self.error = None;
        if let Err(e) = self.validate() {
            self.error = Some(e.to_string());
            return Err(e);
        }

        self.state = FormState::Submitting;
        let request = self.to_request();

        match api.create_evaluation(token, &request).await {
            Ok(receipt) => {
                self.state = FormState::Submitted {
                    message: receipt.message.clone(),
                };
                Ok(receipt)
            }
            Err(e) => {
                self.state = FormState::Editing;
                let text = match e.downcast_ref::<CisError>() {
                    Some(cis) => cis.to_string(),
                    None => "server error".to_string(),
                };
                self.error = Some(text);
                Err(e)
            }
        }
    }

    /// Build the wire request from the draft.
    fn to_request(&self) -> EvaluationRequest {
        EvaluationRequest {
            student_id: self.student_id.clone(),
            student_name_kz: self.student_name_kz.clone(),
            student_name_ru: self.student_name_ru.clone(),
            class_year: self.class_year.clone(),
            overall_comment_kz: self.overall_comment.clone(),
            criteria: self
                .criteria
                .iter()
                .map(|entry| EvaluationCriterion {
                    criterion_id: entry.criterion_id,
                    criterion_name_kz: entry.criterion_name.clone(),
                    score: entry.score,
                    comment_kz: entry.comment.clone(),
                })
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn criteria(&self) -> &[CriterionEntry] {
        &self.criteria
    }

    pub fn student_name(&self) -> &str {
        &self.student_name_kz
    }

    pub fn class_year(&self) -> &str {
        &self.class_year
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
