//! ATECO report assembly.
//!
//! Combines the directory record with the enrichment into the card shown in
//! chat, and derives the session metadata update from it.

use serde::Serialize;

use crate::domain::session::SessionMetaUpdate;

use super::enrichment::{AtecoEnrichment, RiskOutlook};
use super::lookup::{non_blank, AtecoItem, AtecoSuggestion};

pub const MAX_NORMATIVE: usize = 12;
pub const MAX_CERTIFICAZIONI: usize = 8;
const MAX_SUGGESTIONS: usize = 5;
const SETTORE_PREVIEW_CHARS: usize = 100;
const META_LIST_ITEMS: usize = 3;

const MISSING_TITLE: &str = "Titolo non disponibile";
const MISSING_SETTORE: &str = "Settore da analizzare";

/// Codes and titles in both classification years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtecoCodes {
    pub codice_2022: String,
    pub titolo_2022: String,
    pub codice_2025: String,
    pub titolo_2025: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtecoReport {
    pub lookup: AtecoCodes,
    pub arricchimento: String,
    pub normative: Vec<String>,
    pub certificazioni: Vec<String>,
    pub rischi: RiskOutlook,
}

impl AtecoReport {
    /// Builds the report for `input_code`.
    ///
    /// Missing directory values fall back to the input code or a
    /// placeholder title; missing enrichment falls back to a generic
    /// sector text and the default risk outlook.
    pub fn assemble(
        input_code: &str,
        item: Option<&AtecoItem>,
        enrichment: Option<&AtecoEnrichment>,
    ) -> Self {
        let empty = AtecoItem::default();
        let item = item.unwrap_or(&empty);
        let input_code = input_code.trim();

        let titolo_2022 = non_blank(&item.titolo_2022).unwrap_or_default();
        let titolo_2025 = non_blank(&item.titolo_2025).unwrap_or_default();
        let lookup = AtecoCodes {
            codice_2022: non_blank(&item.codice_2022)
                .unwrap_or(input_code)
                .to_string(),
            titolo_2022: or_placeholder(titolo_2022),
            codice_2025: non_blank(&item.codice_2025)
                .unwrap_or(input_code)
                .to_string(),
            titolo_2025: or_placeholder(titolo_2025),
        };

        let arricchimento = enrichment
            .and_then(|e| e.arricchimento.clone())
            .unwrap_or_else(|| {
                let settore = non_blank(&item.settore).unwrap_or("da analizzare");
                let titolo = if titolo_2025.is_empty() { titolo_2022 } else { titolo_2025 };
                format!(
                    "Settore {}. {}. Questo settore richiede un'analisi approfondita per identificare requisiti normativi e rischi specifici.",
                    settore, titolo
                )
            });

        let extra_normative = enrichment.map(|e| e.normative.as_slice()).unwrap_or(&[]);
        let extra_certificazioni = enrichment
            .map(|e| e.certificazioni.as_slice())
            .unwrap_or(&[]);

        Self {
            lookup,
            arricchimento,
            normative: merge_unique(&item.normative, extra_normative, MAX_NORMATIVE),
            certificazioni: merge_unique(
                &item.certificazioni,
                extra_certificazioni,
                MAX_CERTIFICAZIONI,
            ),
            rischi: enrichment
                .and_then(|e| e.rischi.clone())
                .unwrap_or_else(RiskOutlook::fallback),
        }
    }

    /// Session metadata derived from the report.
    ///
    /// The sector preview only uses real enrichment text, never the
    /// fallback sentence.
    pub fn session_update(&self, enrichment: Option<&AtecoEnrichment>) -> SessionMetaUpdate {
        let settore = enrichment
            .and_then(|e| e.arricchimento.as_deref())
            .map(|text| text.chars().take(SETTORE_PREVIEW_CHARS).collect())
            .unwrap_or_else(|| MISSING_SETTORE.to_string());

        SessionMetaUpdate {
            ateco: Some(self.lookup.codice_2025.clone()),
            settore: Some(settore),
            normative: Some(join_first(&self.normative)),
            certificazioni: Some(join_first(&self.certificazioni)),
        }
    }

    /// Headline of the chat card.
    pub fn headline(&self) -> String {
        format!("Analisi ATECO {} completata", self.lookup.codice_2025)
    }
}

/// Chat text listing the first suggestions for a missed code.
pub fn suggestions_message(code: &str, suggestions: &[AtecoSuggestion]) -> String {
    let list = suggestions
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|s| format!("• {}: {}", s.code, s.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "⚠️ Codice ATECO \"{}\" non trovato.\n\n💡 Forse cercavi uno di questi?\n\n{}\n\nClicca su uno dei codici suggeriti per cercarlo.",
        code.trim(),
        list
    )
}

fn or_placeholder(value: &str) -> String {
    if value.is_empty() {
        MISSING_TITLE.to_string()
    } else {
        value.to_string()
    }
}

/// Order-preserving union of `base` then `extra`, capped at `cap`.
fn merge_unique(base: &[String], extra: &[String], cap: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(cap);
    for entry in base.iter().chain(extra) {
        if merged.len() == cap {
            break;
        }
        if !merged.contains(entry) {
            merged.push(entry.clone());
        }
    }
    merged
}

fn join_first(items: &[String]) -> String {
    items
        .iter()
        .take(META_LIST_ITEMS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn retail_item() -> AtecoItem {
        AtecoItem {
            codice_2022: Some("47.11".to_string()),
            titolo_2022: Some("Commercio al dettaglio".to_string()),
            codice_2025: Some("47.11.0".to_string()),
            titolo_2025: Some("Commercio al dettaglio in esercizi non specializzati".to_string()),
            settore: Some("commercio".to_string()),
            normative: vec!["GDPR".to_string(), "D.Lgs 81/08".to_string()],
            certificazioni: vec!["ISO 9001".to_string()],
        }
    }

    mod assemble {
        use super::*;

        #[test]
        fn merges_and_deduplicates_lists() {
            let enrichment = AtecoEnrichment {
                normative: vec!["GDPR".to_string(), "NIS2".to_string()],
                certificazioni: vec!["ISO 27001".to_string(), "ISO 9001".to_string()],
                ..Default::default()
            };
            let report = AtecoReport::assemble("47.11", Some(&retail_item()), Some(&enrichment));
            assert_eq!(report.normative, vec!["GDPR", "D.Lgs 81/08", "NIS2"]);
            assert_eq!(report.certificazioni, vec!["ISO 9001", "ISO 27001"]);
        }

        #[test]
        fn caps_normative_and_certificazioni() {
            let item = AtecoItem {
                normative: strings("N", 10),
                certificazioni: strings("C", 6),
                ..Default::default()
            };
            let enrichment = AtecoEnrichment {
                normative: strings("E", 10),
                certificazioni: strings("K", 10),
                ..Default::default()
            };
            let report = AtecoReport::assemble("01", Some(&item), Some(&enrichment));
            assert_eq!(report.normative.len(), MAX_NORMATIVE);
            assert_eq!(report.certificazioni.len(), MAX_CERTIFICAZIONI);
            assert_eq!(report.normative[10], "E1");
        }

        #[test]
        fn falls_back_without_enrichment() {
            let report = AtecoReport::assemble("47.11", Some(&retail_item()), None);
            assert!(report.arricchimento.starts_with("Settore commercio. Commercio al dettaglio in esercizi"));
            assert_eq!(report.rischi, RiskOutlook::fallback());
        }

        #[test]
        fn unknown_code_uses_input_and_placeholders() {
            let report = AtecoReport::assemble(" 99.99 ", None, None);
            assert_eq!(report.lookup.codice_2022, "99.99");
            assert_eq!(report.lookup.codice_2025, "99.99");
            assert_eq!(report.lookup.titolo_2025, MISSING_TITLE);
            assert!(report.arricchimento.starts_with("Settore da analizzare. ."));
        }
    }

    mod session_update {
        use super::*;

        #[test]
        fn derives_meta_from_report() {
            let enrichment = AtecoEnrichment {
                arricchimento: Some("x".repeat(150)),
                normative: strings("E", 2),
                ..Default::default()
            };
            let report = AtecoReport::assemble("47.11", Some(&retail_item()), Some(&enrichment));
            let update = report.session_update(Some(&enrichment));

            assert_eq!(update.ateco.as_deref(), Some("47.11.0"));
            assert_eq!(update.settore.unwrap().chars().count(), 100);
            assert_eq!(update.normative.as_deref(), Some("GDPR, D.Lgs 81/08, E1"));
            assert_eq!(update.certificazioni.as_deref(), Some("ISO 9001"));
        }

        #[test]
        fn missing_enrichment_gives_placeholder_sector() {
            let report = AtecoReport::assemble("47.11", Some(&retail_item()), None);
            let update = report.session_update(None);
            assert_eq!(update.settore.as_deref(), Some(MISSING_SETTORE));
        }
    }

    #[test]
    fn suggestions_message_lists_at_most_five() {
        let suggestions: Vec<_> = (1..=7)
            .map(|i| AtecoSuggestion {
                code: format!("47.1{}", i),
                title: "Commercio".to_string(),
            })
            .collect();
        let text = suggestions_message("47.1", &suggestions);
        assert_eq!(text.matches('•').count(), 5);
        assert!(text.contains("\"47.1\""));
    }
}
