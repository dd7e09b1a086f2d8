//! Allocation set validation.
//!
//! A strategy mix or holding breakdown is only submittable once its
//! percentages total exactly 100. While a user is still adjusting sliders a
//! mismatch is an ordinary result, so [`validate`] reports it as data and
//! only [`AllocationCheck::ensure_valid`] turns it into an error.

use crate::config::round_to;
use crate::types::Allocation;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Total a complete allocation set must reach.
pub const FULL_ALLOCATION: f64 = 100.0;

/// Remainders smaller than this are treated as zero.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Outcome of validating an allocation set.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationCheck {
    /// Whether the set totals 100%
    pub is_valid: bool,
    /// `100 - sum(percentage)`; negative when over-allocated
    pub remaining: f64,
}

/// Classification of an [`AllocationCheck`] for the remaining-percentage hint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllocationStatus {
    Balanced,
    Under { remaining: f64 },
    Over { excess: f64 },
}

impl AllocationCheck {
    pub fn status(&self) -> AllocationStatus {
        if self.is_valid {
            AllocationStatus::Balanced
        } else if self.remaining > 0.0 {
            AllocationStatus::Under {
                remaining: self.remaining,
            }
        } else {
            AllocationStatus::Over {
                excess: -self.remaining,
            }
        }
    }

    /// Form hint with the remainder rounded to `decimals` places.
    pub fn hint(&self, decimals: u32) -> String {
        match self.status() {
            AllocationStatus::Balanced => "Allocations total 100%".to_string(),
            AllocationStatus::Under { remaining } => {
                format!("{}% remaining to allocate", round_to(remaining, decimals))
            }
            AllocationStatus::Over { excess } => {
                format!("Over-allocated by {}%", round_to(excess, decimals))
            }
        }
    }

    /// Gate for submission: a mismatch becomes [`Error::AllocationMismatch`].
    pub fn ensure_valid(&self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(Error::AllocationMismatch {
                remaining: self.remaining,
            })
        }
    }
}

/// Validate an allocation set with the default tolerance.
pub fn validate(allocations: &[Allocation]) -> Result<AllocationCheck> {
    validate_with_tolerance(allocations, DEFAULT_TOLERANCE)
}

/// Validate an allocation set, treating `|remaining| < tolerance` as balanced.
///
/// Percentages are summed as given, so a single entry above 100 or below 0
/// still yields a check. Fails with [`Error::DuplicateAllocationId`] when two
/// entries share an id and with [`Error::InvalidAllocation`] when a
/// percentage is NaN or infinite.
pub fn validate_with_tolerance(
    allocations: &[Allocation],
    tolerance: f64,
) -> Result<AllocationCheck> {
    let mut seen = HashSet::with_capacity(allocations.len());
    let mut total = 0.0;

    for allocation in allocations {
        if !seen.insert(&allocation.id) {
            tracing::warn!(id = %allocation.id, "duplicate allocation id");
            return Err(Error::DuplicateAllocationId(allocation.id.clone()));
        }
        if !allocation.percentage.is_finite() {
            return Err(Error::InvalidAllocation(format!(
                "{} has percentage {}",
                allocation.id, allocation.percentage
            )));
        }
        total += allocation.percentage;
    }

    let remaining = FULL_ALLOCATION - total;
    let check = AllocationCheck {
        is_valid: remaining.abs() < tolerance,
        remaining,
    };

    tracing::debug!(
        entries = allocations.len(),
        remaining,
        valid = check.is_valid,
        "validated allocation set"
    );

    Ok(check)
}
