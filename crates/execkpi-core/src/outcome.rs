use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, KpiError};

/// Outcome tally for a single experiment group.
///
/// Invariants enforced at construction: `total > 0` and
/// `successes <= total`. A valid instance can therefore always produce a
/// conversion rate in `[0, 1]` without a division-by-zero path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOutcome {
    successes: u64,
    total: u64,
}

impl GroupOutcome {
    /// Validates and creates a group tally.
    pub fn new(successes: u64, total: u64) -> Result<Self, KpiError> {
        if total == 0 {
            return Err(KpiError::InvalidInput(
                ErrorInfo::new("zero-total", "group total must be positive")
                    .with_context("successes", successes.to_string()),
            ));
        }
        if successes > total {
            return Err(KpiError::InvalidInput(
                ErrorInfo::new("successes-exceed-total", "successes cannot exceed total")
                    .with_context("successes", successes.to_string())
                    .with_context("total", total.to_string()),
            ));
        }
        Ok(Self {
            successes,
            total,
        })
    }

    /// Number of converted units in the group.
    pub fn successes(&self) -> u64 {
        self.successes
    }

    /// Number of units assigned to the group.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Conversion rate `successes / total`.
    pub fn rate(&self) -> f64 {
        self.successes as f64 / self.total as f64
    }
}

/// Control and treatment tallies forming one experiment evaluation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentSample {
    /// Control group tally.
    pub control: GroupOutcome,
    /// Treatment group tally.
    pub treatment: GroupOutcome,
}
