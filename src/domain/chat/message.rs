//! Chat message entity.
//!
//! Messages are immutable once appended. Structured payloads carry the data
//! the presentation layer needs to render cards (category grid, event list,
//! description, questions) instead of free text.

use serde::Serialize;

use crate::domain::ateco::AtecoReport;
use crate::domain::foundation::{MessageId, Timestamp};
use crate::domain::risk::{
    AssessmentAnswers, AssessmentField, AssessmentOutcome, CompletedAssessment, EventDescription,
    QuestionNumber, RiskCategory, RiskEvent,
};

/// Who wrote the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

/// Discriminant of a payload, for filtering without matching on data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    Text,
    RiskCategories,
    RiskEvents,
    RiskDescription,
    AssessmentQuestion,
    ControlDescription,
    AssessmentComplete,
    ReportReady,
    AtecoResponse,
    Error,
}

/// Body of a chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessagePayload {
    Text {
        text: String,
    },
    RiskCategories {
        categories: Vec<RiskCategory>,
    },
    RiskEvents {
        /// Backend key of the category the events belong to.
        category: String,
        events: Vec<RiskEvent>,
    },
    RiskDescription {
        description: EventDescription,
    },
    AssessmentQuestion {
        question: QuestionNumber,
        total: usize,
        field: AssessmentField,
    },
    ControlDescription {
        text: String,
    },
    AssessmentComplete {
        event_code: String,
        answers: AssessmentAnswers,
        control_description: Option<String>,
        outcome: AssessmentOutcome,
    },
    ReportReady {
        report: CompletedAssessment,
    },
    AtecoResponse {
        report: AtecoReport,
    },
    Error {
        text: String,
    },
}

impl MessagePayload {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessagePayload::Text { .. } => MessageKind::Text,
            MessagePayload::RiskCategories { .. } => MessageKind::RiskCategories,
            MessagePayload::RiskEvents { .. } => MessageKind::RiskEvents,
            MessagePayload::RiskDescription { .. } => MessageKind::RiskDescription,
            MessagePayload::AssessmentQuestion { .. } => MessageKind::AssessmentQuestion,
            MessagePayload::ControlDescription { .. } => MessageKind::ControlDescription,
            MessagePayload::AssessmentComplete { .. } => MessageKind::AssessmentComplete,
            MessagePayload::ReportReady { .. } => MessageKind::ReportReady,
            MessagePayload::AtecoResponse { .. } => MessageKind::AtecoResponse,
            MessagePayload::Error { .. } => MessageKind::Error,
        }
    }
}

/// A single entry of the chat history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    id: MessageId,
    sender: Sender,
    timestamp: Timestamp,
    payload: MessagePayload,
}

impl ChatMessage {
    pub fn new(sender: Sender, payload: MessagePayload) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            timestamp: Timestamp::now(),
            payload,
        }
    }

    /// Agent message carrying a structured payload.
    pub fn agent(payload: MessagePayload) -> Self {
        Self::new(Sender::Agent, payload)
    }

    pub fn agent_text(text: impl Into<String>) -> Self {
        Self::agent(MessagePayload::Text { text: text.into() })
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Sender::User, MessagePayload::Text { text: text.into() })
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::agent(MessagePayload::Error { text: text.into() })
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn payload(&self) -> &MessagePayload {
        &self.payload
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    /// Cards dropped by a clean restart of the assessment.
    pub fn is_event_description(&self) -> bool {
        matches!(
            self.kind(),
            MessageKind::RiskDescription | MessageKind::ControlDescription
        )
    }
}
