//! ATECO directory records.

use serde::Serialize;

/// One directory record for an ATECO code, in both classification years.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtecoItem {
    pub codice_2022: Option<String>,
    pub titolo_2022: Option<String>,
    pub codice_2025: Option<String>,
    pub titolo_2025: Option<String>,
    pub settore: Option<String>,
    pub normative: Vec<String>,
    pub certificazioni: Vec<String>,
}

impl AtecoItem {
    /// Title to show in lists: 2025 first, then 2022.
    pub fn display_title(&self) -> &str {
        non_blank(&self.titolo_2025)
            .or_else(|| non_blank(&self.titolo_2022))
            .unwrap_or("N/D")
    }
}

/// Nearby code offered when a lookup misses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtecoSuggestion {
    pub code: String,
    pub title: String,
}

/// Result of a directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtecoLookup {
    Found(AtecoItem),
    /// No match, but the directory proposed alternatives.
    Suggestions(Vec<AtecoSuggestion>),
    /// No match and nothing to suggest.
    Missing,
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
