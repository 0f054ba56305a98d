//! Assessment questionnaire: fields, answers and the collaborator outcome.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{Timestamp, ValidationError};

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOption {
    /// Value stored in the answer map and sent to the backend.
    pub value: String,
    /// Text shown on the button.
    pub label: String,
}

impl AssessmentOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose value and label are the same text.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: text.clone(),
            label: text,
        }
    }
}

/// One question of the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentField {
    pub field_name: String,
    pub question: String,
    pub options: Vec<AssessmentOption>,
}

impl AssessmentField {
    pub fn new(
        field_name: impl Into<String>,
        question: impl Into<String>,
        options: Vec<AssessmentOption>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            question: question.into(),
            options,
        }
    }

    /// Resolves a 1-based option choice.
    pub fn choose(&self, choice: usize) -> Result<&AssessmentOption, ValidationError> {
        if choice == 0 || choice > self.options.len() {
            return Err(ValidationError::out_of_range(
                self.field_name.clone(),
                1,
                self.options.len() as i32,
                choice.min(i32::MAX as usize) as i32,
            ));
        }
        Ok(&self.options[choice - 1])
    }
}

/// Answers collected so far, one entry per field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentAnswers(BTreeMap<String, String>);

impl AssessmentAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer, replacing any previous answer for the field.
    pub fn record(&mut self, field_name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field_name.into(), value.into());
    }

    pub fn discard(&mut self, field_name: &str) -> Option<String> {
        self.0.remove(field_name)
    }

    pub fn get(&self, field_name: &str) -> Option<&str> {
        self.0.get(field_name).map(String::as_str)
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.0.contains_key(field_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// True when every field has exactly one answer and nothing else is present.
    pub fn covers_exactly(&self, fields: &[AssessmentField]) -> bool {
        self.0.len() == fields.len() && fields.iter().all(|f| self.0.contains_key(&f.field_name))
    }
}

/// Score and analysis returned by the backend once an assessment is saved.
///
/// The scoring formula lives with the backend; the engine only relays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    pub risk_score: u32,
    pub analysis: String,
}

/// Archived result of a finished assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedAssessment {
    pub category_key: String,
    pub event_code: String,
    pub answers: AssessmentAnswers,
    pub control_description: Option<String>,
    pub outcome: AssessmentOutcome,
    pub completed_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frequency_field() -> AssessmentField {
        AssessmentField::new(
            "frequenza",
            "Con quale frequenza potrebbe verificarsi?",
            vec![
                AssessmentOption::new("1", "Molto bassa"),
                AssessmentOption::new("2", "Bassa"),
                AssessmentOption::new("3", "Media"),
            ],
        )
    }

    #[test]
    fn choose_resolves_one_based_index() {
        assert_eq!(frequency_field().choose(2).unwrap().label, "Bassa");
    }

    #[test]
    fn choose_rejects_zero_and_overflow() {
        let field = frequency_field();
        assert!(field.choose(0).is_err());
        assert_eq!(
            field.choose(4).unwrap_err(),
            ValidationError::out_of_range("frequenza", 1, 3, 4)
        );
    }

    #[test]
    fn record_replaces_previous_answer() {
        let mut answers = AssessmentAnswers::new();
        answers.record("frequenza", "1");
        answers.record("frequenza", "3");
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get("frequenza"), Some("3"));
    }

    #[test]
    fn covers_exactly_detects_missing_and_extra_keys() {
        let fields = vec![frequency_field()];
        let mut answers = AssessmentAnswers::new();
        assert!(!answers.covers_exactly(&fields));
        answers.record("frequenza", "2");
        assert!(answers.covers_exactly(&fields));
        answers.record("altro", "x");
        assert!(!answers.covers_exactly(&fields));
    }

    #[test]
    fn answers_serialize_as_flat_object() {
        let mut answers = AssessmentAnswers::new();
        answers.record("controllo", "++");
        let json = serde_json::to_value(&answers).unwrap();
        assert_eq!(json["controllo"], "++");
    }
}
