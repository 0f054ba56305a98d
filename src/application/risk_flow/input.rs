//! Free-text chat input.
//!
//! Maps what the user types to the operation the current step accepts.
//! Input that fits nothing gets a hint and leaves the step alone.

use crate::domain::chat::{ChatMessage, ChatState};
use crate::domain::risk::{catalog, find_by_backend_key, match_category_input, FlowStep};

use super::RiskFlowEngine;
use crate::application::errors::RiskFlowError;

const START_WORDS: [&str; 3] = ["risk", "rischi", "rischio"];
const CONFIRM_WORDS: [&str; 5] = ["si", "sì", "ok", "yes", "procedi"];
const BACK_WORDS: [&str; 2] = ["indietro", "back"];

const COMPLETION_HELP: &str = "Valutazione completata. Scrivi:\n• \"report\" per generare il report\n• \"altro\" per valutare un altro evento della stessa categoria\n• \"cambia\" per scegliere un'altra categoria\n• \"fine\" per terminare";

impl RiskFlowEngine {
    /// Handles a line typed in the chat box. The line is echoed as a user
    /// message first.
    pub async fn handle_user_input(&self, text: &str) -> Result<(), RiskFlowError> {
        let input = text.trim();
        if input.is_empty() {
            return Ok(());
        }
        self.say(ChatMessage::user_text(input))?;

        let state = self.store.state();
        let lower = input.to_lowercase();
        tracing::debug!(step = %state.step(), input = %lower, "User input");

        match state.step() {
            FlowStep::Idle => {
                if START_WORDS.iter().any(|w| lower.contains(w)) {
                    self.start()
                } else {
                    self.hint("Scrivi \"rischi\" per avviare la valutazione dei rischi.")
                }
            }
            FlowStep::WaitingCategory => match match_category_input(&lower) {
                Some(category) => self.select_category(category.id).await,
                None => self.hint(category_hint()),
            },
            FlowStep::WaitingEvent => match resolve_event(&state, &lower) {
                Some(code) => self.select_event(&code).await,
                None => self.hint(
                    "Non ho trovato l'evento. Scrivi il codice (es. 101), il numero in lista o parte del nome.",
                ),
            },
            FlowStep::WaitingChoice => {
                if CONFIRM_WORDS.contains(&lower.as_str()) {
                    self.confirm_description().await
                } else if lower == "no" || BACK_WORDS.contains(&lower.as_str()) {
                    self.back_to_events()
                } else {
                    self.hint("Scrivi \"sì\" per iniziare la valutazione o \"no\" per scegliere un altro evento.")
                }
            }
            FlowStep::Assessment { .. } => {
                if BACK_WORDS.contains(&lower.as_str()) {
                    return match self.go_back() {
                        Err(err @ RiskFlowError::Locked(_)) => {
                            self.hint("🔒 Non è più possibile tornare indietro in questa fase.")?;
                            Err(err)
                        }
                        Err(err @ RiskFlowError::InvalidStep(_)) => {
                            self.hint("Sei già alla prima domanda.")?;
                            Err(err)
                        }
                        other => other,
                    };
                }
                self.answer_input(&state, &lower).await
            }
            FlowStep::AssessmentComplete | FlowStep::Completed => {
                self.completion_command(&state, &lower).await
            }
        }
    }

    async fn answer_input(&self, state: &ChatState, input: &str) -> Result<(), RiskFlowError> {
        let options = state
            .step()
            .current_question()
            .and_then(|q| state.fields().get(q.index()))
            .map(|f| f.options.len())
            .unwrap_or_default();
        let hint = format!("Rispondi con un numero tra 1 e {}.", options);

        let Ok(choice) = input.parse::<usize>() else {
            return self.hint(hint);
        };
        match self.answer_question(choice).await {
            Err(err @ RiskFlowError::InvalidAnswer(_)) => {
                self.hint(hint)?;
                Err(err)
            }
            other => other,
        }
    }

    async fn completion_command(&self, state: &ChatState, input: &str) -> Result<(), RiskFlowError> {
        match input {
            "report" if state.step() == FlowStep::AssessmentComplete => self.finalize_report(),
            "altro" => {
                let previous = state
                    .selected_category()
                    .and_then(find_by_backend_key)
                    .map(|c| c.id);
                self.restart()?;
                match previous {
                    Some(id) => self.select_category(id).await,
                    None => Ok(()),
                }
            }
            "cambia" => self.restart(),
            "fine" => {
                self.reset();
                self.hint("Grazie per aver usato SYD. Scrivi \"rischi\" quando vuoi iniziare una nuova valutazione.")
            }
            _ => self.hint(COMPLETION_HELP),
        }
    }
}

fn category_hint() -> String {
    let names: Vec<&str> = catalog().iter().map(|c| c.display_name).collect();
    format!(
        "Non ho riconosciuto la categoria. Scegli tra: {}.",
        names.join(", ")
    )
}

/// Event code for typed input: an exact code, a 1-based list position, or
/// a fragment of the name. A bare three-digit code outside the list passes
/// through so selection reports it as not found.
fn resolve_event(state: &ChatState, input: &str) -> Option<String> {
    let events = state.events();
    if let Some(event) = events.iter().find(|e| e.matches_code(input)) {
        return Some(event.code.clone());
    }
    if let Ok(position) = input.parse::<usize>() {
        if (1..=events.len()).contains(&position) {
            return Some(events[position - 1].code.clone());
        }
    }
    if let Some(event) = events.iter().find(|e| e.matches_name(input)) {
        return Some(event.code.clone());
    }
    let is_code = input.len() == 3 && input.chars().all(|c| c.is_ascii_digit());
    is_code.then(|| input.to_string())
}
