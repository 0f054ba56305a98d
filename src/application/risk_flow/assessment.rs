//! Questionnaire steps.

use serde_json::json;

use crate::domain::chat::{ChatAction, MessagePayload};
use crate::domain::foundation::Timestamp;
use crate::domain::risk::{describe_control, CompletedAssessment, FlowStep, CONTROL_FIELD};
use crate::ports::{AssessmentSubmission, TrackedEventType};

use super::{agent, RiskFlowEngine};
use crate::application::errors::RiskFlowError;

impl RiskFlowEngine {
    /// Answers the current question with a 1-based option index.
    ///
    /// Advances to the next question, or on the last one saves the
    /// assessment and moves to `AssessmentComplete` with the backend's
    /// outcome. When saving fails the answer is not recorded.
    ///
    /// # Errors
    ///
    /// - `InvalidStep` outside the questionnaire
    /// - `InvalidAnswer` for an index outside the options
    /// - `NetworkFailure` / `OperationTimedOut` when saving fails
    pub async fn answer_question(&self, choice: usize) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        let Some(question) = state.step().current_question() else {
            return Err(Self::refuse(&state, "answer_question"));
        };
        let field = state.fields().get(question.index()).cloned().ok_or_else(|| {
            RiskFlowError::Internal(format!("no field loaded for question {}", question))
        })?;
        let option = field
            .choose(choice)
            .map_err(|e| RiskFlowError::InvalidAnswer(e.to_string()))?
            .clone();

        let total = state.total_questions();
        let mut actions = vec![ChatAction::RecordAnswer {
            field_name: field.field_name.clone(),
            value: option.value.clone(),
        }];

        let mut control_description = state.control_description().map(str::to_string);
        if field.field_name == CONTROL_FIELD {
            let text = describe_control(&option.value);
            control_description = Some(text.clone());
            actions.push(ChatAction::SetControlDescription(Some(text.clone())));
            actions.push(agent(MessagePayload::ControlDescription { text }));
        }

        if question.get() < total {
            let next = question.next();
            let next_field = state.fields()[next.index()].clone();
            actions.push(ChatAction::SetStep(FlowStep::question(next)));
            actions.push(agent(MessagePayload::AssessmentQuestion {
                question: next,
                total,
                field: next_field,
            }));
            self.commit_if_current(&state, "answer_question", actions)?;
            tracing::debug!(question = %question, value = %option.value, "Question answered");
        } else {
            let mut answers = state.answers().clone();
            answers.record(field.field_name.clone(), option.value.clone());
            let event_code = state.selected_event().unwrap_or_default().to_string();
            let submission = AssessmentSubmission {
                category: state.selected_category().unwrap_or_default().to_string(),
                event_code: event_code.clone(),
                answers: answers.clone(),
                control_description: control_description.clone(),
            };

            let outcome = self
                .call(
                    "save_assessment",
                    "❌ Errore durante il salvataggio della valutazione. Riprova.",
                    self.backend.save_assessment(&submission),
                )
                .await?;

            actions.push(ChatAction::SetOutcome(outcome.clone()));
            actions.push(ChatAction::SetStep(FlowStep::AssessmentComplete));
            actions.push(agent(MessagePayload::AssessmentComplete {
                event_code: event_code.clone(),
                answers,
                control_description,
                outcome: outcome.clone(),
            }));
            if let Err(err) = self.commit_if_current(&state, "answer_question", actions) {
                tracing::warn!(
                    event_code = %event_code,
                    risk_score = outcome.risk_score,
                    "Assessment saved but the flow moved on before it completed"
                );
                return Err(err);
            }
            tracing::info!(
                event_code = %event_code,
                risk_score = outcome.risk_score,
                "Assessment completed"
            );

            self.tracking.record(
                TrackedEventType::RiskEvaluated,
                json!({
                    "category": submission.category,
                    "event_code": event_code,
                    "risk_score": outcome.risk_score,
                }),
            );
        }

        self.tracking.record(
            TrackedEventType::AssessmentQuestionAnswered,
            json!({
                "question": question.get(),
                "field_name": field.field_name,
                "value": option.value,
            }),
        );
        Ok(())
    }

    /// True inside the questionnaire past the first question and before
    /// the hard lock.
    pub fn can_go_back(&self) -> bool {
        let state = self.store.state();
        state.step().can_go_back(state.total_questions())
    }

    /// Returns to the previous question, discarding its answer, and asks
    /// it again.
    ///
    /// # Errors
    ///
    /// `Locked` once hard-locked, `InvalidStep` anywhere else back is not
    /// offered. Nothing changes in either case.
    pub fn go_back(&self) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        if !state.step().can_go_back(state.total_questions()) {
            return Err(Self::refuse(&state, "go_back"));
        }
        let Some(previous) = state.step().current_question().and_then(|q| q.previous()) else {
            return Err(Self::refuse(&state, "go_back"));
        };

        let field = state.fields()[previous.index()].clone();
        let mut actions = vec![
            ChatAction::SetStep(FlowStep::question(previous)),
            ChatAction::DiscardAnswers(vec![field.field_name.clone()]),
        ];
        if field.field_name == CONTROL_FIELD {
            actions.push(ChatAction::SetControlDescription(None));
        }
        actions.push(agent(MessagePayload::AssessmentQuestion {
            question: previous,
            total: state.total_questions(),
            field,
        }));
        self.commit(actions)?;
        tracing::debug!(question = %previous, "Went back one question");
        Ok(())
    }

    /// Archives the finished assessment and moves to `Completed`.
    pub fn finalize_report(&self) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        if state.step() != FlowStep::AssessmentComplete {
            return Err(RiskFlowError::InvalidStep(format!(
                "finalize_report is not allowed at {}",
                state.step()
            )));
        }
        let outcome = state
            .outcome()
            .cloned()
            .ok_or_else(|| RiskFlowError::Internal("assessment has no outcome".to_string()))?;

        let report = CompletedAssessment {
            category_key: state.selected_category().unwrap_or_default().to_string(),
            event_code: state.selected_event().unwrap_or_default().to_string(),
            answers: state.answers().clone(),
            control_description: state.control_description().map(str::to_string),
            outcome,
            completed_at: Timestamp::now(),
        };

        self.commit(vec![
            ChatAction::SetStep(FlowStep::Completed),
            ChatAction::ArchiveReport(report.clone()),
            agent(MessagePayload::ReportReady {
                report: report.clone(),
            }),
        ])?;
        tracing::info!(
            event_code = %report.event_code,
            reports = state.completed_reports().len() + 1,
            "Report finalized"
        );
        Ok(())
    }
}
