//! Sample catalog served in offline mode.

use crate::domain::risk::{AssessmentField, AssessmentOption, RiskEvent};

pub(super) fn sample_events() -> Vec<(&'static str, Vec<RiskEvent>)> {
    let events = |entries: &[(&str, &str)]| -> Vec<RiskEvent> {
        entries
            .iter()
            .map(|(code, name)| RiskEvent::new(*code, *name))
            .collect()
    };

    vec![
        (
            "Damage_Danni",
            events(&[
                ("101", "Incendio"),
                ("102", "Alluvione"),
                ("103", "Terremoto"),
                ("104", "Furto di beni materiali"),
            ]),
        ),
        (
            "Business_disruption",
            events(&[
                ("201", "Attacco ransomware"),
                ("202", "Interruzione dei sistemi informativi"),
                ("203", "Data breach"),
            ]),
        ),
        (
            "Employment_practices_Dipendenti",
            events(&[
                ("301", "Contenzioso con dipendenti"),
                ("302", "Infortunio sul lavoro"),
            ]),
        ),
        (
            "Execution_delivery_Problemi_di_produzione_o_consegna",
            events(&[
                ("401", "Errore di esecuzione del processo"),
                ("402", "Ritardo nelle consegne"),
            ]),
        ),
        (
            "Clients_product_Clienti",
            events(&[
                ("501", "Reclamo di un cliente"),
                ("502", "Sanzione per violazione della privacy"),
            ]),
        ),
        (
            "Internal_Fraud_Frodi_interne",
            events(&[
                ("601", "Appropriazione indebita"),
                ("602", "Corruzione"),
            ]),
        ),
        (
            "External_fraud_Frodi_esterne",
            events(&[
                ("701", "Phishing"),
                ("702", "Furto di identità"),
            ]),
        ),
    ]
}

fn severity_scale() -> Vec<AssessmentOption> {
    vec![
        AssessmentOption::new("G", "🟢 Bassa"),
        AssessmentOption::new("Y", "🟡 Media"),
        AssessmentOption::new("O", "🟠 Alta"),
        AssessmentOption::new("R", "🔴 Critica"),
    ]
}

fn yes_no() -> Vec<AssessmentOption> {
    vec![AssessmentOption::plain("Si"), AssessmentOption::plain("No")]
}

pub(super) fn sample_fields() -> Vec<AssessmentField> {
    vec![
        AssessmentField::new(
            "impatto_finanziario",
            "Qual è l'impatto finanziario stimato dell'evento?",
            ["N/A", "0 - 1K€", "1 - 10K€", "10 - 50K€", "50 - 100K€", "100 - 500K€", "500K€ - 1M€", "1 - 3M€"]
                .into_iter()
                .map(AssessmentOption::plain)
                .collect(),
        ),
        AssessmentField::new(
            "perdita_economica",
            "Quanto è grave la perdita economica attesa?",
            severity_scale(),
        ),
        AssessmentField::new(
            "impatto_immagine",
            "L'evento danneggerebbe l'immagine aziendale?",
            yes_no(),
        ),
        AssessmentField::new(
            "impatto_regolamentare",
            "L'evento comporterebbe sanzioni regolamentari?",
            yes_no(),
        ),
        AssessmentField::new(
            "impatto_criminale",
            "L'evento avrebbe rilevanza penale?",
            yes_no(),
        ),
        AssessmentField::new(
            "perdita_non_economica",
            "Quanto è grave la perdita non economica?",
            severity_scale(),
        ),
        AssessmentField::new(
            "controllo",
            "Come valuti i controlli esistenti?",
            vec![
                AssessmentOption::new("++", "++ Adeguato"),
                AssessmentOption::new("+", "+ Sostanzialmente adeguato"),
                AssessmentOption::new("-", "- Parzialmente adeguato"),
                AssessmentOption::new("--", "-- Non adeguato"),
            ],
        ),
        AssessmentField::new(
            "velocita_manifestazione",
            "Con quale velocità si manifesterebbe l'impatto?",
            vec![
                AssessmentOption::plain("Bassa"),
                AssessmentOption::plain("Media"),
                AssessmentOption::plain("Alta"),
            ],
        ),
    ]
}
