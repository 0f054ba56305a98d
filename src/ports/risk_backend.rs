//! Risk Backend Port - Interface for the risk catalog REST backend.
//!
//! Provides the event lists per category, the event descriptions, the
//! questionnaire fields and the assessment scoring.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::risk::{AssessmentAnswers, AssessmentField, AssessmentOutcome, EventDetails, RiskEvent};

/// Errors from any backend collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl BackendError {
    /// True for failures where retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Network(_) | BackendError::Timeout => true,
            BackendError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Payload saved when the last question is answered.
///
/// Answers are sent flat, keyed by field name, next to the identifying
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentSubmission {
    /// Backend key of the category.
    pub category: String,
    pub event_code: String,
    #[serde(flatten)]
    pub answers: AssessmentAnswers,
    #[serde(rename = "descrizione_controllo", skip_serializing_if = "Option::is_none")]
    pub control_description: Option<String>,
}

#[async_trait]
pub trait RiskBackend: Send + Sync {
    /// Events of a category, addressed by its backend key.
    ///
    /// # Errors
    /// `NotFound` when the backend has no such category.
    async fn fetch_events(&self, category_key: &str) -> Result<Vec<RiskEvent>, BackendError>;

    /// Description fields of an event; every field may be missing.
    async fn fetch_event_details(&self, event_code: &str) -> Result<EventDetails, BackendError>;

    /// Ordered questionnaire, read-only fields already removed.
    async fn fetch_assessment_fields(&self) -> Result<Vec<AssessmentField>, BackendError>;

    /// Saves a finished assessment and returns its score.
    async fn save_assessment(
        &self,
        submission: &AssessmentSubmission,
    ) -> Result<AssessmentOutcome, BackendError>;
}
