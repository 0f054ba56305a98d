//! Error type shared by the risk flow engine and the collaborator services.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::ports::BackendError;

/// Failure of an application operation.
///
/// Every variant leaves the flow step where the operation found it, so the
/// caller can retry the same operation. `Superseded` is the exception: the
/// step was moved by someone else while the operation waited.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RiskFlowError {
    /// Unknown category, event or ATECO code.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Operation timed out: {0}")]
    OperationTimedOut(String),

    /// Option index outside the current question's choices.
    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    /// Attempted while hard-locked; nothing was changed.
    #[error("Flow is locked: {0}")]
    Locked(String),

    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    /// The operation is not accepted in the current step.
    #[error("Invalid step: {0}")]
    InvalidStep(String),

    /// Another operation is still in flight.
    #[error("Another operation is in progress")]
    Busy,

    /// The flow was reset or moved while the backend call was pending; the
    /// result was discarded.
    #[error("Superseded: {0}")]
    Superseded(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RiskFlowError {
    /// True when re-issuing the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RiskFlowError::NetworkFailure(_)
                | RiskFlowError::OperationTimedOut(_)
                | RiskFlowError::Busy
        )
    }
}

impl From<BackendError> for RiskFlowError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(what) => RiskFlowError::NotFound(what),
            BackendError::Timeout => RiskFlowError::OperationTimedOut("backend request".to_string()),
            other => RiskFlowError::NetworkFailure(other.to_string()),
        }
    }
}

impl From<DomainError> for RiskFlowError {
    fn from(err: DomainError) -> Self {
        let message = err.message;
        match err.code {
            ErrorCode::CategoryNotFound | ErrorCode::EventNotFound | ErrorCode::AtecoNotFound => {
                RiskFlowError::NotFound(message)
            }
            ErrorCode::InvalidAnswer => RiskFlowError::InvalidAnswer(message),
            ErrorCode::ValidationFailed => RiskFlowError::ValidationFailure(message),
            ErrorCode::InvalidStateTransition => RiskFlowError::InvalidStep(message),
            ErrorCode::FlowLocked => RiskFlowError::Locked(message),
            ErrorCode::NetworkFailure => RiskFlowError::NetworkFailure(message),
            ErrorCode::OperationTimedOut => RiskFlowError::OperationTimedOut(message),
            ErrorCode::InternalError => RiskFlowError::Internal(message),
        }
    }
}

impl From<ValidationError> for RiskFlowError {
    fn from(err: ValidationError) -> Self {
        RiskFlowError::ValidationFailure(err.to_string())
    }
}
