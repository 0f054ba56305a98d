//! Risk events and their descriptions.

use serde::{Deserialize, Serialize};

/// One selectable risk event of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEvent {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl RiskEvent {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            severity: None,
        }
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    /// Decodes the label form the backend uses for events, either
    /// `**[501]** Name` or `501 - Name`. Labels carrying no code keep the
    /// whole label as code.
    pub fn from_label(label: &str) -> Self {
        if let Some((code, name)) = bracketed_code(label) {
            return Self::new(code, name);
        }
        if let Some((code, name)) = label.split_once(" - ") {
            let code = code.trim();
            if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
                return Self::new(code, name.trim());
            }
        }
        Self::new(label.trim(), label.trim())
    }

    pub fn matches_code(&self, code: &str) -> bool {
        self.code == code.trim()
    }

    /// Case-insensitive substring match on the name.
    pub fn matches_name(&self, fragment: &str) -> bool {
        let fragment = fragment.trim().to_lowercase();
        !fragment.is_empty() && self.name.to_lowercase().contains(&fragment)
    }

    /// Single-line rendering used in text lists.
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }
}

fn bracketed_code(label: &str) -> Option<(String, String)> {
    let open = label.find('[')?;
    let close = open + label[open..].find(']')?;
    let code = &label[open + 1..close];
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let name = label[close + 1..]
        .trim_start_matches(|c: char| c == '*' || c.is_whitespace())
        .trim();
    Some((code.to_string(), name.to_string()))
}

/// Optional fields the description endpoint may return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventDetails {
    pub name: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub probability: Option<String>,
    pub impact: Option<String>,
    pub controls: Option<String>,
    pub monitoring: Option<String>,
}

/// Description card shown before the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDescription {
    pub code: String,
    pub name: String,
    /// Backend key of the owning category.
    pub category: String,
    pub severity: String,
    pub description: String,
    pub probability: String,
    pub impact: String,
    pub controls: String,
    pub monitoring: String,
}

impl EventDescription {
    /// Fills the card from backend details, defaulting what is missing.
    pub fn from_details(code: &str, category: &str, details: EventDetails) -> Self {
        Self {
            code: code.to_string(),
            name: details.name.unwrap_or_else(|| code.to_string()),
            category: category.to_string(),
            severity: details.severity.unwrap_or_else(|| "medium".to_string()),
            description: details.description.unwrap_or_else(|| {
                "Descrizione completa dell'evento di rischio secondo le best practice di risk management."
                    .to_string()
            }),
            probability: details.probability.unwrap_or_else(|| "Media".to_string()),
            impact: details.impact.unwrap_or_else(|| "Significativo".to_string()),
            controls: details.controls.unwrap_or_else(|| "Standard".to_string()),
            monitoring: details.monitoring.unwrap_or_else(|| "Trimestrale".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod from_label {
        use super::*;

        #[test]
        fn parses_bracketed_markdown_code() {
            let event = RiskEvent::from_label("**[501]** Perdita di dati dei clienti");
            assert_eq!(event.code, "501");
            assert_eq!(event.name, "Perdita di dati dei clienti");
        }

        #[test]
        fn parses_dash_separated_code() {
            let event = RiskEvent::from_label("101 - Incendio - magazzino");
            assert_eq!(event.code, "101");
            assert_eq!(event.name, "Incendio - magazzino");
        }

        #[test]
        fn keeps_label_without_code() {
            let event = RiskEvent::from_label("Evento generico");
            assert_eq!(event.code, "Evento generico");
            assert_eq!(event.name, "Evento generico");
        }

        #[test]
        fn ignores_non_numeric_brackets() {
            let event = RiskEvent::from_label("[nota] 202 - Furto");
            assert_eq!(event.code, "[nota] 202 - Furto");
        }
    }

    #[test]
    fn name_match_is_case_insensitive_and_rejects_empty() {
        let event = RiskEvent::new("505", "Attacco Phishing");
        assert!(event.matches_name("phishing"));
        assert!(!event.matches_name("  "));
    }

    #[test]
    fn description_defaults_missing_fields() {
        let description = EventDescription::from_details(
            "505",
            "External_fraud_Frodi_esterne",
            EventDetails {
                name: Some("Phishing".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(description.name, "Phishing");
        assert_eq!(description.severity, "medium");
        assert_eq!(description.probability, "Media");
        assert_eq!(description.monitoring, "Trimestrale");
    }

    #[test]
    fn description_name_falls_back_to_code() {
        let description = EventDescription::from_details("101", "Damage_Danni", EventDetails::default());
        assert_eq!(description.name, "101");
    }
}
