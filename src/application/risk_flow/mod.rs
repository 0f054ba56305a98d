//! Risk Flow Engine.
//!
//! The single authority for advancing the flow step. Every operation
//! validates the current step, fetches what the next step needs from the
//! backend, and commits the new step together with its chat message in one
//! store dispatch.
//!
//! ## Operations
//!
//! - Selection: `start`, `select_category`, `override_category`,
//!   `select_event`, `reload_event`, `confirm_description`,
//!   `back_to_categories`, `back_to_events`
//! - Questionnaire: `answer_question`, `can_go_back`, `go_back`,
//!   `finalize_report`
//! - Changes: `request_category_change`, `request_event_change`,
//!   `clean_restart_assessment`, `reset`, `restart`
//! - Chat box: `handle_user_input`
//!
//! Backend failures leave the step unchanged, add an error message to the
//! chat and raise a notice; the error is returned so the caller can retry.
//! A result that arrives after `reset` or another change moved the flow is
//! dropped with `Superseded`.

mod assessment;
mod changes;
mod input;
mod selection;

pub use changes::ChangeDecision;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::chat::{ChatAction, ChatMessage, ChatState, ChatStore, MessagePayload};
use crate::domain::risk::FlowStep;
use crate::ports::{BackendError, Notifier, RiskBackend};

use super::errors::RiskFlowError;
use super::guard::OperationGuard;
use super::tracking::Tracking;

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSettings {
    /// Upper bound for each backend call.
    pub operation_timeout: Duration,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(20),
        }
    }
}

pub struct RiskFlowEngine {
    backend: Arc<dyn RiskBackend>,
    store: Arc<ChatStore>,
    notifier: Arc<dyn Notifier>,
    tracking: Tracking,
    settings: FlowSettings,
    guard: OperationGuard,
}

impl RiskFlowEngine {
    pub fn new(
        backend: Arc<dyn RiskBackend>,
        store: Arc<ChatStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            backend,
            store,
            notifier,
            tracking: Tracking::disabled(),
            settings: FlowSettings::default(),
            guard: OperationGuard::new(),
        }
    }

    pub fn with_settings(mut self, settings: FlowSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_tracking(mut self, tracking: Tracking) -> Self {
        self.tracking = tracking;
        self
    }

    pub fn store(&self) -> &Arc<ChatStore> {
        &self.store
    }

    /// Snapshot of the chat state.
    pub fn state(&self) -> ChatState {
        self.store.state()
    }

    pub fn step(&self) -> FlowStep {
        self.store.state().step()
    }

    /// True while a backend-touching operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.guard.is_busy()
    }

    // ───────────────────────────────────────────────────────────────────────
    // Helpers
    // ───────────────────────────────────────────────────────────────────────

    fn commit(&self, actions: Vec<ChatAction>) -> Result<(), RiskFlowError> {
        self.store.dispatch_all(actions)?;
        Ok(())
    }

    /// Commits `actions` only if the flow still has the step and selection
    /// it had when `started` was taken. A reset or another change that landed
    /// while a backend call was pending makes the result stale.
    fn commit_if_current(
        &self,
        started: &ChatState,
        operation: &str,
        actions: Vec<ChatAction>,
    ) -> Result<(), RiskFlowError> {
        let applied = self.store.dispatch_all_if(
            |current| {
                current.step() == started.step()
                    && current.selected_category() == started.selected_category()
                    && current.selected_event() == started.selected_event()
            },
            actions,
        )?;
        if applied {
            return Ok(());
        }
        let now = self.step();
        tracing::warn!(
            operation,
            started = %started.step(),
            now = %now,
            "Flow changed during backend call, result discarded"
        );
        Err(RiskFlowError::Superseded(format!(
            "{} started at {} but the flow is now at {}",
            operation,
            started.step(),
            now
        )))
    }

    fn say(&self, message: ChatMessage) -> Result<(), RiskFlowError> {
        self.commit(vec![ChatAction::AddMessage(message)])
    }

    /// Adds a hint to the chat without touching the step.
    fn hint(&self, text: impl Into<String>) -> Result<(), RiskFlowError> {
        self.say(ChatMessage::agent_text(text))
    }

    /// Reports a failure to the user: chat error message plus notice.
    fn report_failure(&self, text: &str, err: &RiskFlowError) {
        tracing::warn!(error = %err, step = %self.step(), "Risk flow operation failed");
        if let Err(e) = self.say(ChatMessage::error(text)) {
            tracing::error!(error = %e, "Failed to record error message");
        }
        self.notifier.error(text);
    }

    /// Runs a backend call with the typing indicator on and the operation
    /// timeout applied. Failures are reported with `failure_text`.
    async fn call<T, F>(&self, operation: &str, failure_text: &str, call: F) -> Result<T, RiskFlowError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        self.set_typing(true);
        let result = match tokio::time::timeout(self.settings.operation_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(RiskFlowError::from(e)),
            Err(_) => Err(RiskFlowError::OperationTimedOut(format!(
                "{} after {}s",
                operation,
                self.settings.operation_timeout.as_secs_f32()
            ))),
        };
        self.set_typing(false);

        if let Err(err) = &result {
            let text = match err {
                RiskFlowError::OperationTimedOut(_) => {
                    "⏱️ Il server non risponde. Riprova tra qualche istante."
                }
                _ => failure_text,
            };
            self.report_failure(text, err);
        }
        result
    }

    fn set_typing(&self, typing: bool) {
        if let Err(e) = self.store.dispatch(ChatAction::SetTyping(typing)) {
            tracing::error!(error = %e, "Failed to update typing indicator");
        }
    }

    /// Error for an operation the current step does not accept; hard-locked
    /// steps report `Locked`.
    fn refuse(state: &ChatState, operation: &str) -> RiskFlowError {
        if state.is_hard_locked() {
            RiskFlowError::Locked(format!(
                "{} is not allowed at {}",
                operation,
                state.step()
            ))
        } else {
            RiskFlowError::InvalidStep(format!(
                "{} is not allowed at {}",
                operation,
                state.step()
            ))
        }
    }
}

impl std::fmt::Debug for RiskFlowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskFlowEngine")
            .field("step", &self.step())
            .field("settings", &self.settings)
            .field("tracking", &self.tracking)
            .field("busy", &self.is_busy())
            .finish()
    }
}

/// Agent payload shorthand.
fn agent(payload: MessagePayload) -> ChatAction {
    ChatAction::AddMessage(ChatMessage::agent(payload))
}
