//! Application layer - the risk flow engine and the collaborator services.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Every operation here is async, `Send`, and safe to share behind `Arc`.

mod errors;
mod guard;
pub mod risk_flow;
pub mod services;
mod tracking;

pub use errors::RiskFlowError;
pub use guard::{OperationGuard, OperationPermit};
pub use risk_flow::{ChangeDecision, FlowSettings, RiskFlowEngine};
pub use services::{AtecoService, AtecoSettings, FeedbackService, ReportService};
pub use tracking::Tracking;
