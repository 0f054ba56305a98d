//! Enrichment payload for an ATECO code.
//!
//! The enricher answers with free text that should contain a JSON object.
//! Anything that does not parse is treated as "no enrichment" and the
//! report falls back to its default content.

use serde::{Deserialize, Serialize};

/// Risks grouped by area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskOutlook {
    #[serde(default)]
    pub operativi: Vec<String>,
    #[serde(default)]
    pub compliance: Vec<String>,
    #[serde(default)]
    pub cyber: Vec<String>,
    #[serde(default)]
    pub reputazionali: Vec<String>,
}

impl RiskOutlook {
    /// Used when the enricher gives no risks.
    pub fn fallback() -> Self {
        let list = |items: [&str; 2]| -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        };
        Self {
            operativi: list([
                "Interruzione dei processi critici",
                "Errori nella gestione operativa",
            ]),
            compliance: list(["Non conformità normative", "Sanzioni amministrative"]),
            cyber: list(["Violazione dati sensibili", "Attacchi ransomware"]),
            reputazionali: list([
                "Perdita di fiducia dei clienti",
                "Danni all'immagine aziendale",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum RisksField {
    Flat(Vec<String>),
    Grouped(RiskOutlook),
}

impl From<RisksField> for RiskOutlook {
    fn from(field: RisksField) -> Self {
        match field {
            RisksField::Flat(items) => RiskOutlook {
                operativi: items,
                ..Default::default()
            },
            RisksField::Grouped(outlook) => outlook,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEnrichment {
    arricchimento: Option<String>,
    settore: Option<String>,
    #[serde(default)]
    normative: Vec<String>,
    #[serde(default)]
    certificazioni: Vec<String>,
    rischi: Option<RisksField>,
}

/// Parsed enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtecoEnrichment {
    pub arricchimento: Option<String>,
    pub normative: Vec<String>,
    pub certificazioni: Vec<String>,
    pub rischi: Option<RiskOutlook>,
}

impl AtecoEnrichment {
    /// Extracts the outermost `{...}` block of `text` and decodes it.
    pub fn from_raw(text: &str) -> Option<Self> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end < start {
            return None;
        }
        let raw: RawEnrichment = serde_json::from_str(&text[start..=end]).ok()?;
        Some(Self {
            arricchimento: raw
                .arricchimento
                .or(raw.settore)
                .filter(|s| !s.trim().is_empty()),
            normative: raw.normative,
            certificazioni: raw.certificazioni,
            rischi: raw.rischi.map(RiskOutlook::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_wrapped_in_prose() {
        let text = r#"Ecco il risultato:
```json
{"settore": "Commercio al dettaglio", "normative": ["GDPR"], "certificazioni": ["ISO 9001"], "rischi": ["Furti"]}
```"#;
        let enrichment = AtecoEnrichment::from_raw(text).unwrap();
        assert_eq!(enrichment.arricchimento.as_deref(), Some("Commercio al dettaglio"));
        assert_eq!(enrichment.normative, vec!["GDPR"]);
        assert_eq!(enrichment.rischi.unwrap().operativi, vec!["Furti"]);
    }

    #[test]
    fn grouped_risks_are_kept() {
        let text = r#"{"arricchimento": "x", "rischi": {"cyber": ["Ransomware"]}}"#;
        let rischi = AtecoEnrichment::from_raw(text).unwrap().rischi.unwrap();
        assert_eq!(rischi.cyber, vec!["Ransomware"]);
        assert!(rischi.operativi.is_empty());
    }

    #[test]
    fn malformed_text_yields_none() {
        assert!(AtecoEnrichment::from_raw("nessun json qui").is_none());
        assert!(AtecoEnrichment::from_raw("} rovesciato {").is_none());
        assert!(AtecoEnrichment::from_raw("{ non valido }").is_none());
    }
}
