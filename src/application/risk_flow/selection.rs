//! Category, event and description steps.

use serde_json::json;

use crate::domain::chat::{ChatAction, ChatState, MessagePayload};
use crate::domain::risk::{
    catalog, find_by_backend_key, find_category, EventDescription, FlowStep, QuestionNumber,
};
use crate::ports::TrackedEventType;

use super::{agent, RiskFlowEngine};
use crate::application::errors::RiskFlowError;

impl RiskFlowEngine {
    /// Opens the category picker. Does nothing outside `Idle`, so the
    /// category list is emitted once however many times this is called.
    pub fn start(&self) -> Result<(), RiskFlowError> {
        let state = self.store.state();
        if state.step() != FlowStep::Idle {
            tracing::debug!(step = %state.step(), "Risk flow already started");
            return Ok(());
        }

        self.commit(vec![
            ChatAction::SetStep(FlowStep::WaitingCategory),
            agent(MessagePayload::RiskCategories {
                categories: catalog().to_vec(),
            }),
        ])?;
        tracing::info!("Risk flow started");
        Ok(())
    }

    /// Loads the events of a category; requires `WaitingCategory`.
    ///
    /// # Errors
    ///
    /// - `InvalidStep` / `Locked` outside `WaitingCategory`
    /// - `NotFound` for an unmapped id or an empty event list
    /// - `NetworkFailure` / `OperationTimedOut` from the backend
    pub async fn select_category(&self, category_id: &str) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        if state.step() != FlowStep::WaitingCategory {
            return Err(Self::refuse(&state, "select_category"));
        }
        self.load_category(category_id).await
    }

    /// Switches category after the user confirmed the change. Accepted in
    /// any step past `Idle` that is not hard-locked.
    pub async fn override_category(&self, category_id: &str) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        if state.is_hard_locked() || state.step() == FlowStep::Idle {
            return Err(Self::refuse(&state, "override_category"));
        }
        tracing::info!(
            from = state.selected_category().unwrap_or("-"),
            to = category_id,
            step = %state.step(),
            "Category override confirmed"
        );
        self.load_category(category_id).await
    }

    async fn load_category(&self, category_id: &str) -> Result<(), RiskFlowError> {
        let started = self.store.state();
        let Some(category) = find_category(category_id) else {
            let err = RiskFlowError::NotFound(format!("category '{}'", category_id));
            self.report_failure(
                &format!("❌ Categoria \"{}\" non riconosciuta.", category_id.trim()),
                &err,
            );
            return Err(err);
        };

        let events = self
            .call(
                "fetch_events",
                "❌ Errore nel caricamento degli eventi. Riprova.",
                self.backend.fetch_events(category.backend_key),
            )
            .await?;

        if events.is_empty() {
            let err = RiskFlowError::NotFound(format!("events of '{}'", category.backend_key));
            self.report_failure("⚠️ Nessun evento trovato per questa categoria.", &err);
            return Err(err);
        }

        let count = events.len();
        self.commit_if_current(
            &started,
            "select_category",
            vec![
                ChatAction::RemoveEventDescriptions,
                ChatAction::SetStep(FlowStep::WaitingEvent),
                ChatAction::SelectCategory {
                    category: category.backend_key.to_string(),
                    events: events.clone(),
                },
                agent(MessagePayload::RiskEvents {
                    category: category.backend_key.to_string(),
                    events,
                }),
            ],
        )?;
        tracing::info!(category = category.id, events = count, "Category selected");

        self.tracking.record(
            TrackedEventType::CategorySelected,
            json!({
                "category": category.id,
                "backend_key": category.backend_key,
                "event_count": count,
            }),
        );
        Ok(())
    }

    /// Loads an event description; requires `WaitingEvent`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the code is not in the loaded event list; the step
    /// stays `WaitingEvent`.
    pub async fn select_event(&self, event_code: &str) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        if state.step() != FlowStep::WaitingEvent {
            return Err(Self::refuse(&state, "select_event"));
        }
        self.load_event(&state, event_code).await
    }

    /// Swaps the event in place, dropping the current questionnaire. Used
    /// after a confirmed event change while the flow is locked.
    pub async fn reload_event(&self, event_code: &str) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        let allowed = matches!(
            state.step(),
            FlowStep::WaitingEvent | FlowStep::WaitingChoice | FlowStep::Assessment { .. }
        );
        if !allowed || state.is_hard_locked() {
            return Err(Self::refuse(&state, "reload_event"));
        }
        self.load_event(&state, event_code).await
    }

    pub(super) async fn load_event(
        &self,
        state: &ChatState,
        event_code: &str,
    ) -> Result<(), RiskFlowError> {
        let code = event_code.trim();
        let known = state.events().iter().any(|e| e.matches_code(code));
        if !known && !state.events().is_empty() {
            let err = RiskFlowError::NotFound(format!("event '{}'", code));
            self.report_failure(
                &format!("⚠️ L'evento {} non è nella lista di questa categoria.", code),
                &err,
            );
            return Err(err);
        }

        let details = self
            .call(
                "fetch_event_details",
                "❌ Errore nel caricamento della descrizione dell'evento. Riprova.",
                self.backend.fetch_event_details(code),
            )
            .await?;

        let category = state
            .selected_category()
            .map(|key| {
                find_by_backend_key(key)
                    .map(|c| c.display_name.to_string())
                    .unwrap_or_else(|| key.to_string())
            })
            .unwrap_or_default();
        let description = EventDescription::from_details(code, &category, details);

        self.commit_if_current(
            state,
            "select_event",
            vec![
                ChatAction::RemoveEventDescriptions,
                ChatAction::SetStep(FlowStep::WaitingChoice),
                ChatAction::SelectEvent {
                    code: code.to_string(),
                },
                agent(MessagePayload::RiskDescription { description }),
            ],
        )?;
        tracing::info!(event_code = code, "Event selected");
        Ok(())
    }

    /// Loads the questionnaire and asks the first question; requires
    /// `WaitingChoice`.
    pub async fn confirm_description(&self) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        if state.step() != FlowStep::WaitingChoice {
            return Err(Self::refuse(&state, "confirm_description"));
        }

        let fields = self
            .call(
                "fetch_assessment_fields",
                "❌ Errore nel caricamento delle domande di valutazione. Riprova.",
                self.backend.fetch_assessment_fields(),
            )
            .await?;

        let Some(first) = fields.first().cloned() else {
            let err = RiskFlowError::NotFound("assessment fields".to_string());
            self.report_failure("⚠️ Nessuna domanda di valutazione disponibile.", &err);
            return Err(err);
        };

        let total = fields.len();
        self.commit_if_current(
            &state,
            "confirm_description",
            vec![
                ChatAction::SetStep(FlowStep::question(QuestionNumber::FIRST)),
                ChatAction::LoadFields(fields),
                agent(MessagePayload::AssessmentQuestion {
                    question: QuestionNumber::FIRST,
                    total,
                    field: first,
                }),
            ],
        )?;
        tracing::info!(
            event_code = state.selected_event().unwrap_or("-"),
            questions = total,
            "Assessment started"
        );
        Ok(())
    }

    /// From the event list back to the category picker, dropping the
    /// category selection.
    pub fn back_to_categories(&self) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        if state.step() != FlowStep::WaitingEvent {
            return Err(Self::refuse(&state, "back_to_categories"));
        }
        self.commit(vec![
            ChatAction::SetStep(FlowStep::WaitingCategory),
            ChatAction::ClearCategorySelection,
            agent(MessagePayload::RiskCategories {
                categories: catalog().to_vec(),
            }),
        ])
    }

    /// From the description back to the event list of the same category.
    pub fn back_to_events(&self) -> Result<(), RiskFlowError> {
        let _permit = self.guard.try_acquire()?;
        let state = self.store.state();
        if state.step() != FlowStep::WaitingChoice {
            return Err(Self::refuse(&state, "back_to_events"));
        }
        self.commit(vec![
            ChatAction::SetStep(FlowStep::WaitingEvent),
            ChatAction::ClearEventSelection,
            ChatAction::RemoveEventDescriptions,
            agent(MessagePayload::RiskEvents {
                category: state.selected_category().unwrap_or_default().to_string(),
                events: state.events().to_vec(),
            }),
        ])
    }
}
