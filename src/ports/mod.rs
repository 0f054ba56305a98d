//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Backend Ports
//!
//! - `RiskBackend` - Event lists, descriptions, questionnaire and scoring
//! - `AtecoDirectory` - ATECO code lookups, single and batched
//! - `AtecoEnricher` - Free-text enrichment of an ATECO code
//! - `FeedbackSink` - Feedback survey submission
//! - `ReportSender` - Pre-report PDF relay
//! - `EventTracker` - Analytics events
//!
//! ## Local Ports
//!
//! - `Notifier` - Transient notices shown next to the chat
//! - `FlagStore` - Persistent boolean flags

mod ateco_directory;
mod event_tracker;
mod feedback_sink;
mod flag_store;
mod notifier;
mod risk_backend;

pub use ateco_directory::{AtecoDirectory, AtecoEnricher};
pub use event_tracker::{EventTracker, TrackedEvent, TrackedEventType, TrackingContext};
pub use feedback_sink::{FeedbackSink, PreReport, PreReportRisk, ReportSender};
pub use flag_store::{FlagStore, FlagStoreError};
pub use notifier::{NoticeLevel, Notifier};
pub use risk_backend::{AssessmentSubmission, BackendError, RiskBackend};
