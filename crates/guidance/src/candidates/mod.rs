//! Candidate onboarding, proficiency scoring, and dashboard statistics.
//!
//! The candidate aggregate moves through a five-step onboarding state
//! machine, accumulates education, experience, targets, and assessment
//! responses, and carries a cached statistics view that is recomputed
//! lazily whenever the underlying records change.

pub(crate) mod assessment;
pub mod domain;
pub(crate) mod intake;
pub(crate) mod onboarding;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;
pub(crate) mod stats;

#[cfg(test)]
mod tests;

pub use assessment::{AssessmentQuestion, AssessmentSheet, SheetQuestion, MAX_QUICK_QUESTIONS};
pub use domain::{
    AssessmentProgress, CandidateId, CandidateProfile, EducationLevel, EducationRecord,
    IdentityDetails, OccupationTarget, ProficiencyEntry, ResponseRating, TargetPriority,
    WorkExperienceRecord,
};
pub use intake::{IntakeViolation, MAX_TARGETS};
pub use onboarding::{OnboardingState, OnboardingStep, ONBOARDING_COMPLETE_SCORE};
pub use repository::{
    CandidateNotification, CandidateRecord, CandidateStore, NotificationPublisher, NotifyError,
    StoreError,
};
pub use router::candidate_router;
pub use scoring::{
    CandidateHistory, ProficiencyEngine, ProficiencyOutcome, ScoreComponent, ScoreFactor,
    ScoringConfig,
};
pub use service::{
    CandidateService, CandidateServiceError, DashboardView, EducationSubmission,
    ExperienceSubmission, IdentitySubmission, OnboardingStatusView, QuickAssessment,
    ResponseSubmission, TargetSubmission,
};
pub use stats::{CandidateStats, StatsAggregator, RECOMMENDATION_LIMIT};
