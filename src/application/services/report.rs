//! Pre-report delivery.
//!
//! Collects every completed assessment of the chat together with the
//! session metadata and hands them to the backend, which renders the PDF
//! and relays it.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::RiskFlowError;
use crate::application::guard::OperationGuard;
use crate::application::tracking::Tracking;
use crate::domain::chat::{ChatAction, ChatMessage, ChatStore};
use crate::domain::session::SessionStore;
use crate::ports::{Notifier, PreReport, PreReportRisk, ReportSender, TrackedEventType};

use super::bounded;

pub struct ReportService {
    sender: Arc<dyn ReportSender>,
    chat: Arc<ChatStore>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    tracking: Tracking,
    timeout: Duration,
    guard: OperationGuard,
}

impl ReportService {
    pub fn new(
        sender: Arc<dyn ReportSender>,
        chat: Arc<ChatStore>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            sender,
            chat,
            session,
            notifier,
            tracking: Tracking::disabled(),
            timeout: Duration::from_secs(20),
            guard: OperationGuard::new(),
        }
    }

    pub fn with_tracking(mut self, tracking: Tracking) -> Self {
        self.tracking = tracking;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Payload for the completed assessments in the chat, if any.
    pub fn build_prereport(&self) -> Option<PreReport> {
        let state = self.chat.state();
        if state.completed_reports().is_empty() {
            return None;
        }
        let risks = state
            .completed_reports()
            .iter()
            .map(|report| PreReportRisk {
                event_code: report.event_code.clone(),
                category: report.category_key.clone(),
                risk_score: report.outcome.risk_score,
                analysis: report.outcome.analysis.clone(),
                control: report.control_description.clone(),
            })
            .collect();
        Some(PreReport {
            risks,
            session_meta: self.session.meta(),
        })
    }

    /// Sends the pre-report.
    ///
    /// # Errors
    ///
    /// - `ValidationFailure` when no assessment has been completed yet
    /// - `NetworkFailure` / `OperationTimedOut` from the backend
    pub async fn send_prereport(&self) -> Result<PreReport, RiskFlowError> {
        let Some(report) = self.build_prereport() else {
            self.notifier
                .error("Completa almeno una valutazione prima di richiedere il report.");
            return Err(RiskFlowError::ValidationFailure(
                "no completed assessment to report".to_string(),
            ));
        };
        let _permit = self.guard.try_acquire()?;

        if let Err(err) = bounded(
            self.timeout,
            "send_prereport",
            self.sender.send_prereport(&report),
        )
        .await
        {
            tracing::warn!(error = %err, "Pre-report delivery failed");
            let text = "❌ Errore durante l'invio del report. Riprova.";
            self.post(ChatMessage::error(text));
            self.notifier.error(text);
            return Err(err);
        }

        tracing::info!(risks = report.risks.len(), "Pre-report sent");
        self.post(ChatMessage::agent_text(
            "📄 Report inviato! Riceverai il PDF a breve.",
        ));
        self.notifier.success("Report inviato con successo");
        self.tracking.record(
            TrackedEventType::ReportGenerated,
            json!({
                "risks": report.risks.len(),
                "ateco": report.session_meta.ateco,
            }),
        );
        Ok(report)
    }

    fn post(&self, message: ChatMessage) {
        if let Err(e) = self.chat.dispatch(ChatAction::AddMessage(message)) {
            tracing::error!(error = %e, "Failed to post report message");
        }
    }
}
