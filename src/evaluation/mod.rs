//! Evaluation subsystem: the rubric form state machine

pub mod form;

pub use form::{
    CriterionEntry, EvaluationForm, FormState, ScoreKey, MAX_SCORE, MIN_SCORE, REQUIRED_CRITERIA,
    SUCCESS_DISPLAY_WINDOW,
};
