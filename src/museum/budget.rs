//! Per-operation attempt budget.

use super::AcquisitionError;

/// Request attempts shared by every step of one acquisition.
///
/// Count probes, page fetches and native random calls all draw from the
/// same budget. A fresh budget is created for each user-triggered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget {
    max: u32,
    used: u32,
}

impl AttemptBudget {
    pub fn new(max: u32) -> Self {
        Self { max, used: 0 }
    }

    /// Take one attempt, returning its 1-based number.
    pub fn consume(&mut self) -> Result<u32, AcquisitionError> {
        if self.used >= self.max {
            return Err(AcquisitionError::MaxAttemptsReached {
                attempts: self.used,
            });
        }
        self.used += 1;
        Ok(self.used)
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }
}
