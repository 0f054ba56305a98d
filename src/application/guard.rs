//! In-flight operation guard.
//!
//! One operation at a time: a second caller fails fast with `Busy` instead
//! of racing the first. The permit is released when it is dropped, which
//! happens when the operation settles, whatever its outcome.

use std::sync::atomic::{AtomicBool, Ordering};

use super::errors::RiskFlowError;

#[derive(Debug, Default)]
pub struct OperationGuard {
    busy: AtomicBool,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the permit.
    ///
    /// # Errors
    ///
    /// `Busy` while another permit is alive.
    pub fn try_acquire(&self) -> Result<OperationPermit<'_>, RiskFlowError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RiskFlowError::Busy)?;
        Ok(OperationPermit { guard: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the guard on drop.
#[derive(Debug)]
pub struct OperationPermit<'a> {
    guard: &'a OperationGuard,
}

impl Drop for OperationPermit<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}
