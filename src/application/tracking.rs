//! Analytics tracking helper.
//!
//! Wraps the optional `EventTracker` with the session's context. Tracking
//! never fails or delays an operation: events are sent from a spawned task
//! and errors and timeouts are logged and dropped.

use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::ports::{EventTracker, TrackedEvent, TrackedEventType, TrackingContext};

const DEFAULT_TRACKING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Tracking {
    tracker: Option<Arc<dyn EventTracker>>,
    context: TrackingContext,
    timeout: Duration,
    /// Sends still running; clones share the list.
    in_flight: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Tracking {
    pub fn new(tracker: Arc<dyn EventTracker>, context: TrackingContext) -> Self {
        Self {
            tracker: Some(tracker),
            context,
            timeout: DEFAULT_TRACKING_TIMEOUT,
            in_flight: Arc::default(),
        }
    }

    /// Tracking switched off; `record` does nothing.
    pub fn disabled() -> Self {
        Self {
            tracker: None,
            context: TrackingContext::anonymous(),
            timeout: DEFAULT_TRACKING_TIMEOUT,
            in_flight: Arc::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn context(&self) -> &TrackingContext {
        &self.context
    }

    /// Sends the event in the background and returns at once.
    ///
    /// Outside a Tokio runtime the event is dropped with a warning.
    pub fn record(&self, event_type: TrackedEventType, data: Value) {
        let Some(tracker) = self.tracker.clone() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(event_type = %event_type, "No runtime, tracking event dropped");
            return;
        };

        let event = TrackedEvent::new(&self.context, event_type, data);
        let timeout = self.timeout;
        let handle = runtime.spawn(async move {
            match tokio::time::timeout(timeout, tracker.track(&event)).await {
                Ok(Ok(())) => tracing::debug!(event_type = %event_type, "Event tracked"),
                Ok(Err(e)) => {
                    tracing::warn!(event_type = %event_type, error = %e, "Tracking failed")
                }
                Err(_) => tracing::warn!(event_type = %event_type, "Tracking timed out"),
            }
        });

        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }

    /// Number of sends not finished yet.
    pub fn pending(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Waits for every send started so far; each is bounded by the
    /// tracking timeout. Call before shutting down.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(
            &mut *self
                .in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Tracking task aborted");
            }
        }
    }
}

impl Default for Tracking {
    fn default() -> Self {
        Self::disabled()
    }
}

impl std::fmt::Debug for Tracking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracking")
            .field("enabled", &self.is_enabled())
            .field("context", &self.context)
            .finish()
    }
}
