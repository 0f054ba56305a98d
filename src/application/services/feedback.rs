//! Feedback survey submission.

use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::RiskFlowError;
use crate::application::guard::OperationGuard;
use crate::domain::feedback::{FeedbackDraft, FeedbackReceipt, FEEDBACK_SUBMITTED_FLAG};
use crate::domain::foundation::ValidationError;
use crate::ports::{FeedbackSink, FlagStore, Notifier, TrackingContext};

use super::bounded;

pub struct FeedbackService {
    sink: Arc<dyn FeedbackSink>,
    flags: Arc<dyn FlagStore>,
    notifier: Arc<dyn Notifier>,
    identity: TrackingContext,
    timeout: Duration,
    guard: OperationGuard,
}

impl FeedbackService {
    pub fn new(
        sink: Arc<dyn FeedbackSink>,
        flags: Arc<dyn FlagStore>,
        notifier: Arc<dyn Notifier>,
        identity: TrackingContext,
    ) -> Self {
        Self {
            sink,
            flags,
            notifier,
            identity,
            timeout: Duration::from_secs(20),
            guard: OperationGuard::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether this installation already sent its survey. An unreadable
    /// flag store counts as not submitted.
    pub async fn has_submitted(&self) -> bool {
        match self.flags.get_flag(FEEDBACK_SUBMITTED_FLAG).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read feedback flag");
                false
            }
        }
    }

    /// Validates and sends the survey.
    ///
    /// A survey the backend already holds is treated as a success. Either
    /// way the submitted flag is persisted.
    ///
    /// # Errors
    ///
    /// - `ValidationFailure` naming the missing ratings
    /// - `NetworkFailure` / `OperationTimedOut` from the backend
    pub async fn submit(
        &self,
        draft: &FeedbackDraft,
        user_email: Option<String>,
    ) -> Result<FeedbackReceipt, RiskFlowError> {
        let user_id = (!self.identity.user_id.is_anonymous()).then(|| self.identity.user_id.clone());
        let submission = draft
            .validate(self.identity.session_id, user_id, user_email)
            .map_err(|e| {
                let message = validation_message(&e);
                self.notifier.error(&message);
                RiskFlowError::ValidationFailure(message)
            })?;

        let _permit = self.guard.try_acquire()?;
        let receipt = match bounded(
            self.timeout,
            "submit_feedback",
            self.sink.submit_feedback(&submission),
        )
        .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(error = %err, "Feedback submission failed");
                self.notifier
                    .error("Errore durante l'invio del feedback. Riprova.");
                return Err(err);
            }
        };

        match &receipt {
            FeedbackReceipt::Accepted => {
                tracing::info!(session_id = %submission.session_id, "Feedback submitted");
                self.notifier.success("Grazie per il tuo feedback!");
            }
            FeedbackReceipt::AlreadySubmitted { message } => {
                tracing::info!(session_id = %submission.session_id, "Feedback already submitted");
                self.notifier.success(message);
            }
        }

        if let Err(e) = self.flags.set_flag(FEEDBACK_SUBMITTED_FLAG, true).await {
            tracing::warn!(error = %e, "Failed to persist feedback flag");
        }
        Ok(receipt)
    }
}

fn validation_message(err: &ValidationError) -> String {
    match err {
        ValidationError::InvalidFormat { reason, .. } => {
            format!("Valutazioni obbligatorie mancanti: {}", reason.trim_start_matches("missing "))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryFlagStore, MockBackend, MockOperation, RecordingNotifier};
    use crate::ports::{BackendError, NoticeLevel};

    fn complete_draft() -> FeedbackDraft {
        FeedbackDraft {
            impression_ui: Some(5),
            impression_utility: Some(4),
            ease_of_use: Some(4),
            innovation: Some(5),
            syd_helpfulness: Some(3),
            assessment_clarity: Some(4),
            liked_most: "  Il flusso guidato ".to_string(),
            improvements: String::new(),
        }
    }

    fn service(backend: MockBackend) -> (FeedbackService, Arc<MockBackend>, InMemoryFlagStore, RecordingNotifier) {
        let backend = Arc::new(backend);
        let flags = InMemoryFlagStore::new();
        let notifier = RecordingNotifier::new();
        let service = FeedbackService::new(
            backend.clone(),
            Arc::new(flags.clone()),
            Arc::new(notifier.clone()),
            TrackingContext::anonymous(),
        );
        (service, backend, flags, notifier)
    }

    #[tokio::test]
    async fn accepted_feedback_sets_flag() {
        let (service, backend, _flags, notifier) = service(MockBackend::new());
        assert!(!service.has_submitted().await);

        let receipt = service.submit(&complete_draft(), None).await.unwrap();

        assert_eq!(receipt, FeedbackReceipt::Accepted);
        assert!(service.has_submitted().await);
        let sent = backend.submitted_feedback();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].liked_most, "Il flusso guidato");
        assert_eq!(sent[0].user_id, None);
        assert_eq!(notifier.count(NoticeLevel::Success), 1);
    }

    #[tokio::test]
    async fn already_submitted_is_a_success() {
        let (service, _backend, _flags, _notifier) =
            service(MockBackend::new().with_feedback_receipt(FeedbackReceipt::AlreadySubmitted {
                message: "Hai già inviato il feedback".to_string(),
            }));

        let receipt = service.submit(&complete_draft(), None).await.unwrap();

        assert!(matches!(receipt, FeedbackReceipt::AlreadySubmitted { .. }));
        assert!(service.has_submitted().await);
    }

    #[tokio::test]
    async fn missing_ratings_are_listed_and_nothing_is_sent() {
        let (service, backend, _flags, notifier) = service(MockBackend::new());
        let draft = FeedbackDraft {
            ease_of_use: None,
            innovation: None,
            ..complete_draft()
        };

        let err = service.submit(&draft, None).await.unwrap_err();

        match err {
            RiskFlowError::ValidationFailure(message) => {
                assert!(message.contains("easeOfUse"), "{}", message);
                assert!(message.contains("innovation"), "{}", message);
            }
            other => panic!("expected ValidationFailure, got {:?}", other),
        }
        assert_eq!(backend.call_count(MockOperation::SubmitFeedback), 0);
        assert_eq!(notifier.count(NoticeLevel::Error), 1);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let (service, _backend, _flags, _notifier) = service(MockBackend::new());
        let draft = FeedbackDraft {
            innovation: Some(9),
            ..complete_draft()
        };
        assert!(matches!(
            service.submit(&draft, None).await,
            Err(RiskFlowError::ValidationFailure(_))
        ));
    }

    #[tokio::test]
    async fn backend_failure_keeps_flag_unset() {
        let (service, _backend, flags, _notifier) = service(MockBackend::new().with_failure(
            MockOperation::SubmitFeedback,
            BackendError::Rejected("Errore interno".to_string()),
        ));

        let result = service.submit(&complete_draft(), None).await;

        assert!(matches!(result, Err(RiskFlowError::NetworkFailure(_))));
        assert!(!flags.get_flag(FEEDBACK_SUBMITTED_FLAG).await.unwrap());
    }
}
