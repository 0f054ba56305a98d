//! Change requests, clean restarts and resets.
//!
//! The request operations only decide; they never mutate. Asking the user
//! for confirmation is the caller's job, after which it calls
//! `override_category`, `reload_event` or `clean_restart_assessment`.

use serde::Serialize;

use crate::domain::chat::{ChatAction, ChatState, MessagePayload};
use crate::domain::risk::{backend_key_for, FlowStep};

use super::{agent, RiskFlowEngine};
use crate::application::errors::RiskFlowError;

/// Answer to a category or event change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDecision {
    /// Same selection as the current one; nothing to do.
    NoChange,
    /// Hard-locked; the change is refused without asking.
    Locked,
    /// An assessment is underway; the user must confirm first.
    NeedsConfirmation,
    /// Nothing to lose; the change can go ahead.
    Proceed,
}

impl ChangeDecision {
    fn decide(state: &ChatState, current: Option<&str>, same_selection: bool) -> Self {
        if same_selection {
            ChangeDecision::NoChange
        } else if state.is_hard_locked() {
            ChangeDecision::Locked
        } else if state.is_process_locked() || current.is_some() {
            ChangeDecision::NeedsConfirmation
        } else {
            ChangeDecision::Proceed
        }
    }
}

impl RiskFlowEngine {
    pub fn request_category_change(&self, category_id: &str) -> ChangeDecision {
        let state = self.store.state();
        let same = match (state.selected_category(), backend_key_for(category_id)) {
            (Some(current), Some(requested)) => current == requested,
            _ => false,
        };
        let decision = ChangeDecision::decide(&state, state.selected_category(), same);
        tracing::debug!(category = category_id, decision = ?decision, step = %state.step(), "Category change requested");
        decision
    }

    pub fn request_event_change(&self, event_code: &str) -> ChangeDecision {
        let state = self.store.state();
        let same = state.selected_event() == Some(event_code.trim());
        let decision = ChangeDecision::decide(&state, state.selected_event(), same);
        tracing::debug!(event_code, decision = ?decision, step = %state.step(), "Event change requested");
        decision
    }

    /// Drops the current event and questionnaire and returns to the event
    /// list of the same category; with `new_event_code` the new event is
    /// selected right away.
    ///
    /// # Errors
    ///
    /// `Locked` when hard-locked; `InvalidStep` before an event list is
    /// loaded.
    pub async fn clean_restart_assessment(
        &self,
        new_event_code: Option<&str>,
    ) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        let allowed = matches!(
            state.step(),
            FlowStep::WaitingEvent | FlowStep::WaitingChoice | FlowStep::Assessment { .. }
        );
        if !allowed || state.is_hard_locked() {
            return Err(Self::refuse(&state, "clean_restart_assessment"));
        }

        let mut actions = vec![
            ChatAction::SetStep(FlowStep::WaitingEvent),
            ChatAction::ClearEventSelection,
            ChatAction::RemoveEventDescriptions,
        ];
        if new_event_code.is_none() {
            actions.push(agent(MessagePayload::RiskEvents {
                category: state.selected_category().unwrap_or_default().to_string(),
                events: state.events().to_vec(),
            }));
        }
        self.commit(actions)?;
        tracing::info!(
            from = %state.step(),
            new_event = new_event_code.unwrap_or("-"),
            "Assessment restarted"
        );

        match new_event_code {
            Some(code) => self.load_event(&self.store.state(), code).await,
            None => Ok(()),
        }
    }

    /// Back to `Idle` from anywhere, hard lock included. Completed reports
    /// and the message history are kept.
    pub fn reset(&self) {
        let from = self.step();
        if let Err(e) = self.store.dispatch(ChatAction::Reset) {
            tracing::error!(error = %e, "Reset rejected by the store");
            return;
        }
        tracing::info!(from = %from, "Risk flow reset");
    }

    /// Reset followed by a fresh start: a new assessment in the same chat.
    pub fn restart(&self) -> Result<(), RiskFlowError> {
        self.reset();
        self.start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockBackend, RecordingNotifier};
    use crate::domain::chat::{ChatStore, MessageKind};
    use std::sync::Arc;

    fn engine() -> RiskFlowEngine {
        RiskFlowEngine::new(
            Arc::new(MockBackend::with_sample_catalog()),
            Arc::new(ChatStore::new()),
            Arc::new(RecordingNotifier::new()),
        )
    }

    async fn at_description(engine: &RiskFlowEngine) {
        engine.start().unwrap();
        engine.select_category("danni").await.unwrap();
        engine.select_event("101").await.unwrap();
    }

    mod decisions {
        use super::*;

        #[test]
        fn fresh_flow_proceeds() {
            let engine = engine();
            assert_eq!(engine.request_category_change("danni"), ChangeDecision::Proceed);
            engine.start().unwrap();
            assert_eq!(engine.request_category_change("sistemi"), ChangeDecision::Proceed);
        }

        #[tokio::test]
        async fn same_category_by_alias_is_no_change() {
            let engine = engine();
            at_description(&engine).await;
            assert_eq!(engine.request_category_change("danni"), ChangeDecision::NoChange);
            assert_eq!(engine.request_event_change(" 101 "), ChangeDecision::NoChange);
        }

        #[tokio::test]
        async fn different_selection_mid_flow_needs_confirmation() {
            let engine = engine();
            at_description(&engine).await;
            assert_eq!(
                engine.request_event_change("102"),
                ChangeDecision::NeedsConfirmation
            );
            assert_eq!(
                engine.request_category_change("clienti"),
                ChangeDecision::NeedsConfirmation
            );
        }
    }

    mod restarts {
        use super::*;

        #[tokio::test]
        async fn clean_restart_without_code_relists_events() {
            let engine = engine();
            at_description(&engine).await;
            engine.confirm_description().await.unwrap();
            engine.answer_question(1).await.unwrap();

            engine.clean_restart_assessment(None).await.unwrap();

            let state = engine.state();
            assert_eq!(state.step(), FlowStep::WaitingEvent);
            assert_eq!(state.selected_event(), None);
            assert!(state.answers().is_empty());
            assert_eq!(state.selected_category(), Some("Damage_Danni"));
            let lists = state
                .messages()
                .iter()
                .filter(|m| m.kind() == MessageKind::RiskEvents)
                .count();
            assert_eq!(lists, 2);
        }

        #[tokio::test]
        async fn clean_restart_refused_before_events() {
            let engine = engine();
            engine.start().unwrap();
            assert!(matches!(
                engine.clean_restart_assessment(None).await,
                Err(RiskFlowError::InvalidStep(_))
            ));
        }

        #[tokio::test]
        async fn restart_opens_a_new_category_picker() {
            let engine = engine();
            at_description(&engine).await;

            engine.restart().unwrap();

            assert_eq!(engine.step(), FlowStep::WaitingCategory);
            assert_eq!(engine.state().selected_category(), None);
        }

        #[test]
        fn reset_from_idle_is_harmless() {
            let engine = engine();
            engine.reset();
            assert_eq!(engine.step(), FlowStep::Idle);
        }
    }
}
