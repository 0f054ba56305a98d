//! Session metadata and theme.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata cached from the last ATECO analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub ateco: String,
    pub settore: String,
    /// First regulations, comma separated.
    pub normative: String,
    /// First certifications, comma separated.
    pub certificazioni: String,
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMetaUpdate {
    pub ateco: Option<String>,
    pub settore: Option<String>,
    pub normative: Option<String>,
    pub certificazioni: Option<String>,
}

impl SessionMeta {
    pub fn merge(&mut self, update: SessionMetaUpdate) {
        if let Some(ateco) = update.ateco {
            self.ateco = ateco;
        }
        if let Some(settore) = update.settore {
            self.settore = settore;
        }
        if let Some(normative) = update.normative {
            self.normative = normative;
        }
        if let Some(certificazioni) = update.certificazioni {
            self.certificazioni = certificazioni;
        }
    }

    pub fn has_ateco(&self) -> bool {
        !self.ateco.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}
