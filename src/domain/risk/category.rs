//! Static risk category catalog.
//!
//! The seven operational risk categories (Basel II event types) shown on
//! the category cards, and the fixed table translating a UI category id
//! into the backend key used by the events endpoint.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskCategory {
    pub id: &'static str,
    pub display_name: &'static str,
    pub backend_key: &'static str,
    pub event_count: u32,
    pub description: &'static str,
}

const CATALOG: [RiskCategory; 7] = [
    RiskCategory {
        id: "danni",
        display_name: "DANNI FISICI",
        backend_key: "Damage_Danni",
        event_count: 10,
        description: "Disastri naturali, incendi, furti",
    },
    RiskCategory {
        id: "sistemi",
        display_name: "SISTEMI & IT",
        backend_key: "Business_disruption",
        event_count: 20,
        description: "Cyber attack, downtime, data breach",
    },
    RiskCategory {
        id: "dipendenti",
        display_name: "RISORSE UMANE",
        backend_key: "Employment_practices_Dipendenti",
        event_count: 22,
        description: "Controversie, infortuni, turnover",
    },
    RiskCategory {
        id: "produzione",
        display_name: "OPERATIONS",
        backend_key: "Execution_delivery_Problemi_di_produzione_o_consegna",
        event_count: 59,
        description: "Errori processo, qualità, consegne",
    },
    RiskCategory {
        id: "clienti",
        display_name: "CLIENTI & COMPLIANCE",
        backend_key: "Clients_product_Clienti",
        event_count: 44,
        description: "Reclami, sanzioni, reputation",
    },
    RiskCategory {
        id: "frodi interne",
        display_name: "FRODI INTERNE",
        backend_key: "Internal_Fraud_Frodi_interne",
        event_count: 20,
        description: "Appropriazione, corruzione, insider",
    },
    RiskCategory {
        id: "frodi esterne",
        display_name: "FRODI ESTERNE",
        backend_key: "External_fraud_Frodi_esterne",
        event_count: 16,
        description: "Falsificazione, phishing, furto identità",
    },
];

/// UI id → backend key. Eight entries: the seven ids plus the bare
/// `frodi` alias, which resolves to internal fraud.
static BACKEND_KEYS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut keys: HashMap<&'static str, &'static str> =
        CATALOG.iter().map(|c| (c.id, c.backend_key)).collect();
    keys.insert("frodi", "Internal_Fraud_Frodi_interne");
    keys
});

/// Free-text keywords recognised when the user types instead of clicking.
const KEYWORDS: [(&str, &[&str]); 7] = [
    ("frodi esterne", &["frodi estern", "hacker", "phishing"]),
    ("frodi interne", &["frodi intern", "furto intern", "insider"]),
    ("clienti", &["client", "privacy"]),
    ("danni", &["dann", "disastr", "incend", "terremot"]),
    ("sistemi", &["sistem", "informat", "computer"]),
    ("dipendenti", &["dipendent", "personal"]),
    ("produzione", &["produzion", "consegn"]),
];

/// All categories in card order.
pub fn catalog() -> &'static [RiskCategory] {
    &CATALOG
}

/// Looks up a category by UI id (case-insensitive); aliases resolve too.
pub fn find_category(id: &str) -> Option<&'static RiskCategory> {
    let key = backend_key_for(id)?;
    find_by_backend_key(key)
}

/// Translates a UI category id into the events-endpoint path segment.
pub fn backend_key_for(id: &str) -> Option<&'static str> {
    let normalized = id.trim().to_lowercase();
    BACKEND_KEYS.get(normalized.as_str()).copied()
}

pub fn find_by_backend_key(key: &str) -> Option<&'static RiskCategory> {
    CATALOG.iter().find(|c| c.backend_key == key)
}

/// Resolves free text such as "rischi con i clienti" to a category.
pub fn match_category_input(input: &str) -> Option<&'static RiskCategory> {
    let lower = input.trim().to_lowercase();
    if let Some(category) = find_category(&lower) {
        return Some(category);
    }
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .and_then(|(id, _)| find_category(id))
}
