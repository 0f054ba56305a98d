//! Control adequacy lookup for the `controllo` question.

/// Field whose answer triggers the control description.
pub const CONTROL_FIELD: &str = "controllo";

/// Internal control adequacy levels, encoded `++`, `+`, `-`, `--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlLevel {
    Adequate,
    SubstantiallyAdequate,
    PartiallyAdequate,
    Inadequate,
}

impl ControlLevel {
    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim() {
            "++" => Some(Self::Adequate),
            "+" => Some(Self::SubstantiallyAdequate),
            "-" => Some(Self::PartiallyAdequate),
            "--" => Some(Self::Inadequate),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Adequate => "Adeguato",
            Self::SubstantiallyAdequate => "Sostanzialmente adeguato",
            Self::PartiallyAdequate => "Parzialmente Adeguato",
            Self::Inadequate => "Non adeguato / assente",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Adequate => "Il sistema di controllo interno è efficace ed adeguato (controlli 1 e 2 sono attivi e consolidati)",
            Self::SubstantiallyAdequate => "Alcune correzioni potrebbero rendere soddisfacente il sistema di controllo interno (controlli 1 e 2 presenti ma parzialmente strutturati)",
            Self::PartiallyAdequate => "Il sistema di controllo interno deve essere migliorato e il processo dovrebbe essere più strettamente controllato (controlli 1 e 2 NON formalizzati)",
            Self::Inadequate => "Il sistema di controllo interno dei processi deve essere riorganizzato immediatamente (livelli di controllo 1 e 2 NON attivi)",
        }
    }
}

/// Text stored alongside the answers once the control level is known.
pub fn describe_control(value: &str) -> String {
    match ControlLevel::from_value(value) {
        Some(level) => format!("✓ {}\n{}", level.title(), level.description()),
        None => "Seleziona un livello di controllo per vedere la descrizione".to_string(),
    }
}
