//! Feedback and report delivery ports.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::feedback::{FeedbackReceipt, FeedbackSubmission};
use crate::domain::session::SessionMeta;

use super::BackendError;

#[async_trait]
pub trait FeedbackSink: Send + Sync {
    /// Submits the survey.
    ///
    /// # Errors
    /// `Rejected` with the backend's message when it refuses the survey for
    /// any reason other than a duplicate.
    async fn submit_feedback(
        &self,
        submission: &FeedbackSubmission,
    ) -> Result<FeedbackReceipt, BackendError>;
}

/// Risk data sent with the pre-report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreReportRisk {
    pub event_code: String,
    pub category: String,
    pub risk_score: u32,
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
}

/// Body of `POST /api/send-prereport-pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreReport {
    pub risks: Vec<PreReportRisk>,
    pub session_meta: SessionMeta,
}

/// Relays a pre-report to the backend, which renders and forwards the PDF.
#[async_trait]
pub trait ReportSender: Send + Sync {
    async fn send_prereport(&self, report: &PreReport) -> Result<(), BackendError>;
}
