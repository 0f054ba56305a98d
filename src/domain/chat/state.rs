//! Chat state and its reducer.
//!
//! `ChatState` holds the message history together with everything the
//! risk flow needs: the current step, the selected category and event,
//! the loaded questionnaire and the collected answers. It only changes
//! through [`ChatState::apply`].
//!
//! # Invariants
//!
//! - `answers` only holds keys of the loaded `fields`, one value each
//! - step changes follow the `FlowStep` transition table; `Reset` is the
//!   only action that bypasses it
//! - `completed_reports` survives resets

use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode, StateMachine};
use crate::domain::risk::{
    AssessmentAnswers, AssessmentField, AssessmentOutcome, CompletedAssessment, FlowStep,
    LockState, RiskEvent,
};

use super::message::ChatMessage;

/// Mutations accepted by the chat store.
#[derive(Debug, Clone)]
pub enum ChatAction {
    AddMessage(ChatMessage),
    /// Drops description and control-description cards.
    RemoveEventDescriptions,
    ClearMessages,
    SetTyping(bool),
    SetStep(FlowStep),
    /// Selects a category and its event list; clears everything downstream.
    SelectCategory {
        category: String,
        events: Vec<RiskEvent>,
    },
    /// Selects an event; clears the questionnaire state.
    SelectEvent {
        code: String,
    },
    ClearCategorySelection,
    ClearEventSelection,
    LoadFields(Vec<AssessmentField>),
    RecordAnswer {
        field_name: String,
        value: String,
    },
    DiscardAnswers(Vec<String>),
    SetControlDescription(Option<String>),
    SetOutcome(AssessmentOutcome),
    ArchiveReport(CompletedAssessment),
    /// Back to `Idle` with an empty risk selection.
    Reset,
}

/// Snapshot of the chat store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    is_typing: bool,
    step: FlowStep,
    selected_category: Option<String>,
    selected_event: Option<String>,
    events: Vec<RiskEvent>,
    fields: Vec<AssessmentField>,
    answers: AssessmentAnswers,
    control_description: Option<String>,
    outcome: Option<AssessmentOutcome>,
    completed_reports: Vec<CompletedAssessment>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an action. On error the state is left untouched.
    pub fn apply(&mut self, action: ChatAction) -> Result<(), DomainError> {
        match action {
            ChatAction::AddMessage(message) => self.messages.push(message),
            ChatAction::RemoveEventDescriptions => {
                self.messages.retain(|m| !m.is_event_description())
            }
            ChatAction::ClearMessages => self.messages.clear(),
            ChatAction::SetTyping(typing) => self.is_typing = typing,
            ChatAction::SetStep(target) => {
                self.step = self.step.transition_to(target)?;
            }
            ChatAction::SelectCategory { category, events } => {
                self.selected_category = Some(category);
                self.events = events;
                self.clear_event();
            }
            ChatAction::SelectEvent { code } => {
                if !self.events.is_empty() && !self.events.iter().any(|e| e.matches_code(&code)) {
                    return Err(DomainError::new(
                        ErrorCode::EventNotFound,
                        format!("Event {} is not in the loaded list", code),
                    ));
                }
                self.clear_event();
                self.selected_event = Some(code);
            }
            ChatAction::ClearCategorySelection => {
                self.selected_category = None;
                self.events.clear();
                self.clear_event();
            }
            ChatAction::ClearEventSelection => self.clear_event(),
            ChatAction::LoadFields(fields) => {
                self.fields = fields;
                self.answers.clear();
            }
            ChatAction::RecordAnswer { field_name, value } => {
                if !self.fields.iter().any(|f| f.field_name == field_name) {
                    return Err(DomainError::new(
                        ErrorCode::InvalidAnswer,
                        format!("Unknown assessment field '{}'", field_name),
                    ));
                }
                self.answers.record(field_name, value);
            }
            ChatAction::DiscardAnswers(field_names) => {
                for name in &field_names {
                    self.answers.discard(name);
                }
            }
            ChatAction::SetControlDescription(text) => self.control_description = text,
            ChatAction::SetOutcome(outcome) => self.outcome = Some(outcome),
            ChatAction::ArchiveReport(report) => self.completed_reports.push(report),
            ChatAction::Reset => {
                self.step = FlowStep::Idle;
                self.selected_category = None;
                self.events.clear();
                self.clear_event();
                self.is_typing = false;
            }
        }
        Ok(())
    }

    fn clear_event(&mut self) {
        self.selected_event = None;
        self.fields.clear();
        self.answers.clear();
        self.control_description = None;
        self.outcome = None;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    pub fn selected_event(&self) -> Option<&str> {
        self.selected_event.as_deref()
    }

    pub fn events(&self) -> &[RiskEvent] {
        &self.events
    }

    pub fn fields(&self) -> &[AssessmentField] {
        &self.fields
    }

    pub fn answers(&self) -> &AssessmentAnswers {
        &self.answers
    }

    pub fn control_description(&self) -> Option<&str> {
        self.control_description.as_deref()
    }

    pub fn outcome(&self) -> Option<&AssessmentOutcome> {
        self.outcome.as_ref()
    }

    pub fn completed_reports(&self) -> &[CompletedAssessment] {
        &self.completed_reports
    }

    pub fn total_questions(&self) -> usize {
        self.fields.len()
    }

    pub fn is_process_locked(&self) -> bool {
        self.step.is_process_locked()
    }

    pub fn is_hard_locked(&self) -> bool {
        self.step.is_hard_locked(self.total_questions())
    }

    pub fn lock_state(&self) -> LockState {
        self.step.lock_state(self.total_questions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::message::{MessageKind, MessagePayload};
    use crate::domain::risk::{AssessmentOption, QuestionNumber};

    fn fields(n: usize) -> Vec<AssessmentField> {
        (1..=n)
            .map(|i| {
                AssessmentField::new(
                    format!("field_{}", i),
                    format!("Domanda {}", i),
                    vec![AssessmentOption::plain("A"), AssessmentOption::plain("B")],
                )
            })
            .collect()
    }

    fn walk_to(state: &mut ChatState, steps: &[FlowStep]) {
        for step in steps {
            state.apply(ChatAction::SetStep(*step)).unwrap();
        }
    }

    fn at_first_question() -> ChatState {
        let mut state = ChatState::new();
        walk_to(&mut state, &[FlowStep::WaitingCategory, FlowStep::WaitingEvent]);
        state
            .apply(ChatAction::SelectCategory {
                category: "Damage_Danni".to_string(),
                events: vec![RiskEvent::new("101", "Incendio")],
            })
            .unwrap();
        state
            .apply(ChatAction::SelectEvent { code: "101".to_string() })
            .unwrap();
        walk_to(&mut state, &[FlowStep::WaitingChoice]);
        state.apply(ChatAction::LoadFields(fields(8))).unwrap();
        walk_to(&mut state, &[FlowStep::question(QuestionNumber::FIRST)]);
        state
    }

    mod steps {
        use super::*;

        #[test]
        fn new_state_is_idle_and_unlocked() {
            let state = ChatState::new();
            assert_eq!(state.step(), FlowStep::Idle);
            assert_eq!(state.lock_state(), LockState::default());
        }

        #[test]
        fn rejects_invalid_transition_without_mutation() {
            let mut state = ChatState::new();
            let err = state.apply(ChatAction::SetStep(FlowStep::WaitingChoice)).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
            assert_eq!(state.step(), FlowStep::Idle);
        }

        #[test]
        fn reset_bypasses_hard_lock_and_keeps_archive() {
            let mut state = at_first_question();
            let q = |n| FlowStep::question(QuestionNumber::new(n).unwrap());
            walk_to(&mut state, &(2..=7).map(q).collect::<Vec<_>>());
            assert!(state.is_hard_locked());
            state
                .apply(ChatAction::ArchiveReport(CompletedAssessment {
                    category_key: "Damage_Danni".to_string(),
                    event_code: "101".to_string(),
                    answers: AssessmentAnswers::new(),
                    control_description: None,
                    outcome: AssessmentOutcome {
                        risk_score: 10,
                        analysis: "ok".to_string(),
                    },
                    completed_at: crate::domain::foundation::Timestamp::now(),
                }))
                .unwrap();

            state.apply(ChatAction::Reset).unwrap();

            assert_eq!(state.step(), FlowStep::Idle);
            assert!(state.selected_category().is_none());
            assert!(state.answers().is_empty());
            assert_eq!(state.completed_reports().len(), 1);
        }
    }

    mod answers {
        use super::*;

        #[test]
        fn unknown_field_is_rejected() {
            let mut state = at_first_question();
            let err = state
                .apply(ChatAction::RecordAnswer {
                    field_name: "nope".to_string(),
                    value: "A".to_string(),
                })
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidAnswer);
            assert!(state.answers().is_empty());
        }

        #[test]
        fn selecting_event_clears_answers_and_fields() {
            let mut state = at_first_question();
            state
                .apply(ChatAction::RecordAnswer {
                    field_name: "field_1".to_string(),
                    value: "A".to_string(),
                })
                .unwrap();
            state
                .apply(ChatAction::SelectEvent { code: "101".to_string() })
                .unwrap();
            assert!(state.answers().is_empty());
            assert!(state.fields().is_empty());
        }

        #[test]
        fn event_outside_loaded_list_is_rejected() {
            let mut state = at_first_question();
            let err = state
                .apply(ChatAction::SelectEvent { code: "999".to_string() })
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::EventNotFound);
            assert_eq!(state.selected_event(), Some("101"));
        }
    }

    mod messages {
        use super::*;

        #[test]
        fn remove_event_descriptions_keeps_other_messages() {
            let mut state = ChatState::new();
            for message in [
                ChatMessage::agent_text("benvenuto"),
                ChatMessage::agent(MessagePayload::ControlDescription {
                    text: "✓ Adeguato".to_string(),
                }),
                ChatMessage::user_text("101"),
            ] {
                state.apply(ChatAction::AddMessage(message)).unwrap();
            }

            state.apply(ChatAction::RemoveEventDescriptions).unwrap();

            let kinds: Vec<_> = state.messages().iter().map(|m| m.kind()).collect();
            assert_eq!(kinds, vec![MessageKind::Text, MessageKind::Text]);
        }
    }
}
