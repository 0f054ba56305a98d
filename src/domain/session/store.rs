//! Shared session store.

use serde::Serialize;
use std::sync::RwLock;

use super::meta::{SessionMeta, SessionMetaUpdate, Theme};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub meta: SessionMeta,
    pub theme: Theme,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn meta(&self) -> SessionMeta {
        self.state().meta
    }

    pub fn update_meta(&self, update: SessionMetaUpdate) {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .meta
            .merge(update);
    }

    pub fn clear_meta(&self) {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .meta = SessionMeta::default();
    }

    pub fn theme(&self) -> Theme {
        self.state().theme
    }

    pub fn set_theme(&self, theme: Theme) {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .theme = theme;
    }

    /// Flips the theme and returns the new one.
    pub fn toggle_theme(&self) -> Theme {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.theme = state.theme.toggled();
        state.theme
    }
}
