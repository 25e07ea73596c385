//! Write-boundary validation for onboarding submissions.
//!
//! The guard enforces the record invariants the scoring core assumes as
//! preconditions: at most one target per occupation, one per priority slot,
//! three targets total, and internally consistent work-experience dates.

use chrono::NaiveDate;

use super::domain::{IdentityDetails, OccupationTarget, TargetPriority};
use crate::content::OccupationId;

/// Maximum number of occupation targets per candidate, one per priority slot.
pub const MAX_TARGETS: usize = 3;

/// Validation errors raised by the intake guard.
#[derive(Debug, thiserror::Error)]
pub enum IntakeViolation {
    #[error("identity requires both a first and last name")]
    MissingIdentityName,
    #[error("work experience cannot end before it starts ({start} > {end})")]
    ExperienceEndsBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("target limit reached ({MAX_TARGETS} occupations)")]
    TargetLimitReached,
    #[error("occupation is already targeted")]
    OccupationAlreadyTargeted,
    #[error("priority slot '{0}' is already taken")]
    PrioritySlotTaken(&'static str),
}

/// Guard validating inbound candidate submissions.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_identity(&self, details: &IdentityDetails) -> Result<(), IntakeViolation> {
        if details.first_name.trim().is_empty() || details.last_name.trim().is_empty() {
            return Err(IntakeViolation::MissingIdentityName);
        }
        Ok(())
    }

    pub fn validate_experience(
        &self,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<(), IntakeViolation> {
        if let Some(end) = end_date {
            if end < start_date {
                return Err(IntakeViolation::ExperienceEndsBeforeStart {
                    start: start_date,
                    end,
                });
            }
        }
        Ok(())
    }

    pub fn validate_target(
        &self,
        existing: &[OccupationTarget],
        occupation_id: &OccupationId,
        priority: TargetPriority,
    ) -> Result<(), IntakeViolation> {
        if existing.len() >= MAX_TARGETS {
            return Err(IntakeViolation::TargetLimitReached);
        }
        if existing
            .iter()
            .any(|target| &target.occupation_id == occupation_id)
        {
            return Err(IntakeViolation::OccupationAlreadyTargeted);
        }
        if existing.iter().any(|target| target.priority == priority) {
            return Err(IntakeViolation::PrioritySlotTaken(priority.label()));
        }
        Ok(())
    }
}
