use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::domain::{
    CandidateId, CandidateProfile, EducationRecord, OccupationTarget, ResponseMap,
    WorkExperienceRecord,
};
use super::onboarding::OnboardingState;
use super::scoring::CandidateHistory;

/// The aggregate a store persists for one candidate: the profile with its
/// cached statistics, the onboarding position, and all child records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_id: CandidateId,
    pub profile: CandidateProfile,
    pub onboarding: OnboardingState,
    pub education: Vec<EducationRecord>,
    pub experience: Vec<WorkExperienceRecord>,
    pub targets: Vec<OccupationTarget>,
    pub responses: ResponseMap,
}

impl CandidateRecord {
    /// The lazy default created on a candidate's first onboarding touch:
    /// zero score, stats dirty.
    pub fn new(candidate_id: CandidateId) -> Self {
        Self {
            candidate_id,
            profile: CandidateProfile::default(),
            onboarding: OnboardingState::default(),
            education: Vec::new(),
            experience: Vec::new(),
            targets: Vec::new(),
            responses: BTreeMap::new(),
        }
    }

    /// Borrowed view for the proficiency engine.
    pub fn history(&self) -> CandidateHistory<'_> {
        CandidateHistory {
            education: &self.education,
            experience: &self.experience,
            responses: &self.responses,
        }
    }

    /// Flip the dirty flag after any child-record write; the next dashboard
    /// read recomputes the cached statistics.
    pub fn mark_stats_dirty(&mut self) {
        self.profile.stats_update_needed = true;
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait CandidateStore: Send + Sync {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, StoreError>;
    fn update(&self, record: CandidateRecord) -> Result<(), StoreError>;
    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, StoreError>;
    /// Candidates whose cached statistics need recomputation, for the batch
    /// refresh trigger.
    fn dirty(&self, limit: usize) -> Result<Vec<CandidateRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Trait describing outbound notification hooks (e-mail adapters and the
/// like).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: CandidateNotification) -> Result<(), NotifyError>;
}

/// Notification payload so routes/tests can assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateNotification {
    pub template: String,
    pub candidate_id: CandidateId,
    pub details: BTreeMap<String, String>,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
