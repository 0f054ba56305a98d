//! Chat store: shared owner of [`ChatState`] with synchronous observers.
//!
//! The store is injected into the engine and the presentation layer alike.
//! `dispatch` applies an action through the reducer and, when it succeeds,
//! calls every observer in registration order with the new snapshot before
//! returning.

use std::sync::{Arc, Mutex, RwLock};

use crate::domain::foundation::{DomainError, SubscriptionId};

use super::state::{ChatAction, ChatState};

/// Receives a snapshot after every successful dispatch.
pub trait StoreObserver: Send + Sync {
    fn on_change(&self, state: &ChatState);
}

impl<F> StoreObserver for F
where
    F: Fn(&ChatState) + Send + Sync,
{
    fn on_change(&self, state: &ChatState) {
        self(state)
    }
}

type ObserverList = Vec<(SubscriptionId, Arc<dyn StoreObserver>)>;

#[derive(Default)]
pub struct ChatStore {
    state: RwLock<ChatState>,
    observers: Mutex<ObserverList>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with an existing state.
    pub fn with_state(state: ChatState) -> Self {
        Self {
            state: RwLock::new(state),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> ChatState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Applies an action and notifies observers.
    ///
    /// # Errors
    ///
    /// Returns the reducer's error; the state and observers are untouched.
    pub fn dispatch(&self, action: ChatAction) -> Result<(), DomainError> {
        self.dispatch_all([action])
    }

    /// Applies several actions as one change: either all of them commit
    /// and observers are notified once, or none does.
    pub fn dispatch_all(
        &self,
        actions: impl IntoIterator<Item = ChatAction>,
    ) -> Result<(), DomainError> {
        self.dispatch_all_if(|_| true, actions).map(|_| ())
    }

    /// Like [`dispatch_all`](Self::dispatch_all), but only when `precondition`
    /// holds for the state at commit time. The check and the commit happen
    /// under the same write lock.
    ///
    /// Returns `Ok(false)` without touching the state or the observers when
    /// the precondition fails.
    pub fn dispatch_all_if(
        &self,
        precondition: impl FnOnce(&ChatState) -> bool,
        actions: impl IntoIterator<Item = ChatAction>,
    ) -> Result<bool, DomainError> {
        let snapshot = {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !precondition(&state) {
                return Ok(false);
            }
            let mut next = state.clone();
            for action in actions {
                next.apply(action)?;
            }
            *state = next;
            state.clone()
        };

        // Observers may dispatch or subscribe from the callback, so the
        // list is copied out before calling them.
        let observers: Vec<Arc<dyn StoreObserver>> = self
            .observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer.on_change(&snapshot);
        }
        Ok(true)
    }

    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, observer));
        id
    }

    /// Removes an observer. Returns false when the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl std::fmt::Debug for ChatStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStore")
            .field("step", &self.state().step())
            .field("observers", &self.observer_count())
            .finish()
    }
}
