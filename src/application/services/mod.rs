//! Collaborator services.
//!
//! Flows around the risk engine that talk to the backend on the user's
//! behalf:
//!
//! - `AtecoService` - Single and batch ATECO lookups, session metadata
//! - `FeedbackService` - Feedback survey submission
//! - `ReportService` - Pre-report PDF relay

mod ateco;
mod feedback;
mod report;

pub use ateco::{AtecoService, AtecoSettings};
pub use feedback::FeedbackService;
pub use report::ReportService;

use std::future::Future;
use std::time::Duration;

use crate::ports::BackendError;

use super::errors::RiskFlowError;

/// Runs a backend call under a timeout, converting its error.
pub(crate) async fn bounded<T, F>(
    timeout: Duration,
    operation: &str,
    call: F,
) -> Result<T, RiskFlowError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(RiskFlowError::from),
        Err(_) => Err(RiskFlowError::OperationTimedOut(format!(
            "{} after {}s",
            operation,
            timeout.as_secs_f32()
        ))),
    }
}
