//! Event Tracker Port - analytics events for the admin dashboard.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::domain::foundation::{SessionId, Timestamp, UserId};

use super::BackendError;

/// Tracked user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedEventType {
    CategorySelected,
    RiskEvaluated,
    AssessmentQuestionAnswered,
    ReportGenerated,
}

impl fmt::Display for TrackedEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrackedEventType::CategorySelected => "category_selected",
            TrackedEventType::RiskEvaluated => "risk_evaluated",
            TrackedEventType::AssessmentQuestionAnswered => "assessment_question_answered",
            TrackedEventType::ReportGenerated => "report_generated",
        };
        write!(f, "{}", s)
    }
}

/// Identity attached to every tracked event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingContext {
    pub user_id: UserId,
    pub session_id: SessionId,
}

impl TrackingContext {
    pub fn new(user_id: UserId, session_id: SessionId) -> Self {
        Self { user_id, session_id }
    }

    /// Context for a user that has not logged in.
    pub fn anonymous() -> Self {
        Self::new(UserId::anonymous(), SessionId::new())
    }
}

/// Wire body of `POST /api/events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
    pub user_id: String,
    pub session_id: String,
    pub event_type: TrackedEventType,
    pub event_data: Value,
}

impl TrackedEvent {
    /// Builds the body, stamping `tracked_at` into the data object.
    pub fn new(context: &TrackingContext, event_type: TrackedEventType, data: Value) -> Self {
        let mut event_data = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        event_data.insert(
            "tracked_at".to_string(),
            Value::String(Timestamp::now().to_rfc3339()),
        );
        Self {
            user_id: context.user_id.as_str().to_string(),
            session_id: context.session_id.to_string(),
            event_type,
            event_data: Value::Object(event_data),
        }
    }
}

#[async_trait]
pub trait EventTracker: Send + Sync {
    async fn track(&self, event: &TrackedEvent) -> Result<(), BackendError>;
}
