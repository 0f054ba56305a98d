//! Wire shapes of the REST backend and their conversion to domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ateco::{AtecoItem, AtecoLookup, AtecoSuggestion};
use crate::domain::risk::{AssessmentField, AssessmentOption, AssessmentOutcome, RiskEvent};

// ────────────────────────────────────────────────────────────────────────────
// Risk catalog
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(super) struct EventsResponse {
    #[serde(default)]
    pub events: Vec<EventEntry>,
}

/// The events endpoint sends labels or objects, sometimes mixed.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum EventEntry {
    Label(String),
    Object {
        code: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        severity: Option<String>,
    },
}

impl From<EventEntry> for RiskEvent {
    fn from(entry: EventEntry) -> Self {
        match entry {
            EventEntry::Label(label) => RiskEvent::from_label(&label),
            EventEntry::Object {
                code,
                name,
                severity,
            } => {
                let name = name.unwrap_or_else(|| code.clone());
                let event = RiskEvent::new(code, name);
                match severity {
                    Some(severity) => event.with_severity(severity),
                    None => event,
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FieldsResponse {
    #[serde(default)]
    pub fields: Vec<FieldDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FieldDto {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    field_name: Option<String>,
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<OptionDto>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl FieldDto {
    /// Converts to a question; read-only and unnamed fields are dropped.
    pub fn into_field(self) -> Option<AssessmentField> {
        if self.kind.as_deref() == Some("readonly") {
            return None;
        }
        let name = self.id.or(self.field_name)?;
        let options = self.options.into_iter().map(OptionDto::into_option).collect();
        Some(AssessmentField::new(name, self.question, options))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OptionDto {
    Text(String),
    Object {
        #[serde(default)]
        value: Option<Value>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        emoji: Option<String>,
    },
}

impl OptionDto {
    fn into_option(self) -> AssessmentOption {
        match self {
            OptionDto::Text(text) => AssessmentOption::plain(text),
            OptionDto::Object {
                value,
                label,
                text,
                emoji,
            } => {
                let value = value.map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
                let label = label.or(text).or_else(|| value.clone()).unwrap_or_default();
                let label = match emoji {
                    Some(emoji) if !emoji.is_empty() => format!("{} {}", emoji, label),
                    _ => label,
                };
                AssessmentOption::new(value.unwrap_or_else(|| label.clone()), label)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SaveResponse {
    #[serde(default)]
    risk_score: f64,
    #[serde(default)]
    analysis: String,
}

impl From<SaveResponse> for AssessmentOutcome {
    fn from(response: SaveResponse) -> Self {
        AssessmentOutcome {
            risk_score: response.risk_score.round().clamp(0.0, u32::MAX as f64) as u32,
            analysis: response.analysis,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ATECO
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(super) struct LookupResponse {
    #[serde(default)]
    found: u32,
    #[serde(default)]
    items: Vec<AtecoItemDto>,
    #[serde(default)]
    suggestions: Vec<SuggestionDto>,
}

impl LookupResponse {
    pub fn first_item(self) -> Option<AtecoItem> {
        if self.found == 0 {
            return None;
        }
        self.items.into_iter().next().map(AtecoItem::from)
    }
}

impl From<LookupResponse> for AtecoLookup {
    fn from(response: LookupResponse) -> Self {
        if response.found > 0 && !response.items.is_empty() {
            return response
                .first_item()
                .map(AtecoLookup::Found)
                .unwrap_or(AtecoLookup::Missing);
        }
        if response.suggestions.is_empty() {
            return AtecoLookup::Missing;
        }
        AtecoLookup::Suggestions(
            response
                .suggestions
                .into_iter()
                .map(|s| AtecoSuggestion {
                    code: s.code,
                    title: s.title,
                })
                .collect(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct AtecoItemDto {
    #[serde(rename = "CODICE_ATECO_2022", default)]
    codice_2022: Option<String>,
    #[serde(rename = "TITOLO_ATECO_2022", default)]
    titolo_2022: Option<String>,
    #[serde(rename = "CODICE_ATECO_2025_RAPPRESENTATIVO", default)]
    codice_2025: Option<String>,
    #[serde(rename = "TITOLO_ATECO_2025_RAPPRESENTATIVO", default)]
    titolo_2025: Option<String>,
    #[serde(default)]
    settore: Option<String>,
    #[serde(default)]
    normative: Vec<String>,
    #[serde(default)]
    certificazioni: Vec<String>,
}

impl From<AtecoItemDto> for AtecoItem {
    fn from(dto: AtecoItemDto) -> Self {
        AtecoItem {
            codice_2022: dto.codice_2022,
            titolo_2022: dto.titolo_2022,
            codice_2025: dto.codice_2025,
            titolo_2025: dto.titolo_2025,
            settore: dto.settore,
            normative: dto.normative,
            certificazioni: dto.certificazioni,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuggestionDto {
    code: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Serialize)]
pub(super) struct BatchRequest<'a> {
    pub codes: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(super) struct BatchResponse {
    #[serde(default)]
    pub results: Vec<LookupResponse>,
}

// ────────────────────────────────────────────────────────────────────────────
// Feedback and reports
// ────────────────────────────────────────────────────────────────────────────

/// `{success, error?, message?}` as answered by the feedback and report
/// endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct AckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod events {
        use super::*;

        #[test]
        fn decodes_mixed_labels_and_objects() {
            let response: EventsResponse = serde_json::from_value(json!({
                "events": [
                    "101 - Incendio",
                    {"code": "102", "name": "Alluvione", "severity": "high"},
                    {"code": "103"}
                ]
            }))
            .unwrap();
            let events: Vec<RiskEvent> = response.events.into_iter().map(RiskEvent::from).collect();
            assert_eq!(events[0], RiskEvent::new("101", "Incendio"));
            assert_eq!(events[1].severity.as_deref(), Some("high"));
            assert_eq!(events[2].name, "103");
        }

        #[test]
        fn missing_events_key_is_empty_list() {
            let response: EventsResponse = serde_json::from_value(json!({})).unwrap();
            assert!(response.events.is_empty());
        }
    }

    mod fields {
        use super::*;

        #[test]
        fn filters_readonly_and_prefers_id() {
            let response: FieldsResponse = serde_json::from_value(json!({
                "fields": [
                    {"id": "perdita_economica", "field_name": "Perdita economica", "question": "Quanto?", "options": ["G", "Y"]},
                    {"id": "descrizione_controllo", "question": "", "type": "readonly"},
                    {"field_name": "controllo", "question": "Controlli?", "options": [
                        {"value": "++", "label": "Adeguato", "emoji": "🟢"},
                        {"value": 2, "text": "Due"}
                    ]}
                ]
            }))
            .unwrap();
            let fields: Vec<AssessmentField> =
                response.fields.into_iter().filter_map(FieldDto::into_field).collect();

            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].field_name, "perdita_economica");
            assert_eq!(fields[0].options[1], AssessmentOption::plain("Y"));
            assert_eq!(fields[1].field_name, "controllo");
            assert_eq!(fields[1].options[0], AssessmentOption::new("++", "🟢 Adeguato"));
            assert_eq!(fields[1].options[1], AssessmentOption::new("2", "Due"));
        }
    }

    mod ateco {
        use super::*;

        #[test]
        fn found_response_maps_first_item() {
            let response: LookupResponse = serde_json::from_value(json!({
                "found": 1,
                "items": [{"CODICE_ATECO_2022": "62.01", "TITOLO_ATECO_2022": "Software", "normative": ["GDPR"]}]
            }))
            .unwrap();
            match AtecoLookup::from(response) {
                AtecoLookup::Found(item) => {
                    assert_eq!(item.codice_2022.as_deref(), Some("62.01"));
                    assert_eq!(item.normative, vec!["GDPR"]);
                    assert!(item.certificazioni.is_empty());
                }
                other => panic!("expected Found, got {:?}", other),
            }
        }

        #[test]
        fn miss_with_suggestions() {
            let response: LookupResponse = serde_json::from_value(json!({
                "found": 0,
                "items": [],
                "suggestions": [{"code": "62.02", "title": "Consulenza"}]
            }))
            .unwrap();
            assert_eq!(
                AtecoLookup::from(response),
                AtecoLookup::Suggestions(vec![AtecoSuggestion {
                    code: "62.02".to_string(),
                    title: "Consulenza".to_string()
                }])
            );
        }

        #[test]
        fn bare_miss() {
            let response: LookupResponse = serde_json::from_value(json!({"found": 0})).unwrap();
            assert_eq!(AtecoLookup::from(response), AtecoLookup::Missing);
        }
    }

    #[test]
    fn save_response_rounds_score() {
        let response: SaveResponse =
            serde_json::from_value(json!({"risk_score": 72.6, "analysis": "Rischio alto"})).unwrap();
        let outcome = AssessmentOutcome::from(response);
        assert_eq!(outcome.risk_score, 73);
        assert_eq!(outcome.analysis, "Rischio alto");
    }
}
