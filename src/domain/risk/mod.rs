//! Risk assessment domain.
//!
//! - `category` - the static category catalog and backend key table
//! - `event` - risk events and description cards
//! - `assessment` - questionnaire fields, answers and outcomes
//! - `control` - control adequacy lookup
//! - `step` - the flow step state machine and lock predicates

mod assessment;
mod category;
mod control;
mod event;
mod step;

pub use assessment::{
    AssessmentAnswers, AssessmentField, AssessmentOption, AssessmentOutcome, CompletedAssessment,
};
pub use category::{
    backend_key_for, catalog, find_by_backend_key, find_category, match_category_input,
    RiskCategory,
};
pub use control::{describe_control, ControlLevel, CONTROL_FIELD};
pub use event::{EventDescription, EventDetails, RiskEvent};
pub use step::{hard_lock_threshold, FlowStep, LockState, QuestionNumber};
