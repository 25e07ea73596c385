use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::assessment::{
    select_comprehensive_tasks, select_quick_tasks, AssessmentQuestion, AssessmentSheet,
    ResolvedTarget,
};
use super::domain::{
    CandidateId, EducationLevel, EducationRecord, IdentityDetails, OccupationTarget,
    ProficiencyEntry, ResponseRating, TargetPriority, WorkExperienceRecord,
};
use super::intake::{IntakeGuard, IntakeViolation};
use super::onboarding::OnboardingStep;
use super::repository::{
    CandidateNotification, CandidateRecord, CandidateStore, NotificationPublisher, NotifyError,
    StoreError,
};
use super::scoring::{ProficiencyEngine, ScoringConfig};
use super::stats::{CandidateStats, StatsAggregator};
use crate::content::{CatalogError, ContentCatalog, OccupationId, TaskId};

/// Identity step submission.
pub type IdentitySubmission = IdentityDetails;

/// Education step submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationSubmission {
    pub level: EducationLevel,
    pub institution: String,
    pub field_of_study: String,
    pub year_completed: u16,
}

/// Work-experience step submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceSubmission {
    pub job_title: String,
    pub company: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Target step submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSubmission {
    pub occupation_id: OccupationId,
    pub priority: TargetPriority,
}

/// One answered assessment question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSubmission {
    pub task_id: TaskId,
    pub response: ResponseRating,
}

/// Public onboarding position for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingStatusView {
    pub candidate_id: CandidateId,
    pub score: u8,
    pub active_step: &'static str,
    pub is_onboarded: bool,
}

/// The quick onboarding assessment, freshly randomized per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickAssessment {
    pub candidate_id: CandidateId,
    pub questions: Vec<AssessmentQuestion>,
}

/// Dashboard view served from the cached statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub candidate_id: CandidateId,
    pub score: u8,
    pub active_step: &'static str,
    pub is_onboarded: bool,
    pub highest_nqf_level: String,
    pub occupation_matches_count: u32,
    pub assessment_progress: BTreeMap<crate::content::OfoCode, super::domain::AssessmentProgress>,
    pub recommended_occupations: Vec<ProficiencyEntry>,
    pub stats_last_computed: Option<DateTime<Utc>>,
}

/// Error raised by the candidate service.
#[derive(Debug, thiserror::Error)]
pub enum CandidateServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("occupation not found")]
    OccupationNotFound,
}

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_record_id(prefix: &str) -> String {
    let id = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

/// Service composing the intake guard, store, catalog, notifier, and stats
/// aggregator. Every touch lazily creates the candidate record, every read
/// path runs the onboarding self-heal, and every child-record write marks
/// the cached statistics dirty.
pub struct CandidateService<S, C, N> {
    guard: IntakeGuard,
    store: Arc<S>,
    catalog: Arc<C>,
    notifier: Arc<N>,
    aggregator: StatsAggregator,
}

impl<S, C, N> CandidateService<S, C, N>
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, catalog: Arc<C>, notifier: Arc<N>, config: ScoringConfig) -> Self {
        Self {
            guard: IntakeGuard::new(),
            store,
            catalog,
            notifier,
            aggregator: StatsAggregator::new(ProficiencyEngine::new(config)),
        }
    }

    fn load_or_create(&self, id: &CandidateId) -> Result<CandidateRecord, CandidateServiceError> {
        match self.store.fetch(id)? {
            Some(mut record) => {
                if record.onboarding.reconcile() {
                    warn!(candidate = %id.0, "repaired onboarded flag below completion score");
                    self.store.update(record.clone())?;
                }
                Ok(record)
            }
            None => Ok(self.store.insert(CandidateRecord::new(id.clone()))?),
        }
    }

    fn status_view(record: &CandidateRecord) -> OnboardingStatusView {
        OnboardingStatusView {
            candidate_id: record.candidate_id.clone(),
            score: record.onboarding.score,
            active_step: record.onboarding.active_step().label(),
            is_onboarded: record.onboarding.is_onboarded,
        }
    }

    /// Current onboarding position; creates the record on first touch.
    pub fn onboarding_status(
        &self,
        id: &CandidateId,
    ) -> Result<OnboardingStatusView, CandidateServiceError> {
        let record = self.load_or_create(id)?;
        Ok(Self::status_view(&record))
    }

    /// Identity step: validate and store the basic profile details.
    pub fn record_identity(
        &self,
        id: &CandidateId,
        details: IdentitySubmission,
    ) -> Result<OnboardingStatusView, CandidateServiceError> {
        self.guard.validate_identity(&details)?;

        let mut record = self.load_or_create(id)?;
        record.profile.identity = Some(details);
        record
            .onboarding
            .raise_score(OnboardingStep::Profile.completion_score());
        self.store.update(record.clone())?;
        Ok(Self::status_view(&record))
    }

    /// Education step: append a record; the first one completes the step.
    pub fn add_education(
        &self,
        id: &CandidateId,
        submission: EducationSubmission,
    ) -> Result<EducationRecord, CandidateServiceError> {
        let mut record = self.load_or_create(id)?;
        let entry = EducationRecord {
            id: next_record_id("edu"),
            level: submission.level,
            institution: submission.institution,
            field_of_study: submission.field_of_study,
            year_completed: submission.year_completed,
        };
        record.education.push(entry.clone());
        record.mark_stats_dirty();
        record
            .onboarding
            .raise_score(OnboardingStep::Education.completion_score());
        self.store.update(record)?;
        Ok(entry)
    }

    /// Remove an education record. Removals never lower the onboarding
    /// score; an unknown record id is a no-op.
    pub fn remove_education(
        &self,
        id: &CandidateId,
        record_id: &str,
    ) -> Result<OnboardingStatusView, CandidateServiceError> {
        let mut record = self.load_or_create(id)?;
        let before = record.education.len();
        record.education.retain(|entry| entry.id != record_id);
        if record.education.len() != before {
            record.mark_stats_dirty();
        }
        self.store.update(record.clone())?;
        Ok(Self::status_view(&record))
    }

    /// Work-experience step.
    pub fn add_experience(
        &self,
        id: &CandidateId,
        submission: ExperienceSubmission,
    ) -> Result<WorkExperienceRecord, CandidateServiceError> {
        self.guard
            .validate_experience(submission.start_date, submission.end_date)?;

        let mut record = self.load_or_create(id)?;
        let entry = WorkExperienceRecord {
            id: next_record_id("exp"),
            job_title: submission.job_title,
            company: submission.company,
            start_date: submission.start_date,
            end_date: submission.end_date,
        };
        record.experience.push(entry.clone());
        record.mark_stats_dirty();
        record
            .onboarding
            .raise_score(OnboardingStep::Experience.completion_score());
        self.store.update(record)?;
        Ok(entry)
    }

    pub fn remove_experience(
        &self,
        id: &CandidateId,
        record_id: &str,
    ) -> Result<OnboardingStatusView, CandidateServiceError> {
        let mut record = self.load_or_create(id)?;
        let before = record.experience.len();
        record.experience.retain(|entry| entry.id != record_id);
        if record.experience.len() != before {
            record.mark_stats_dirty();
        }
        self.store.update(record.clone())?;
        Ok(Self::status_view(&record))
    }

    /// Target step: slot-guarded, catalog-checked.
    pub fn add_target(
        &self,
        id: &CandidateId,
        submission: TargetSubmission,
    ) -> Result<OnboardingStatusView, CandidateServiceError> {
        if self.catalog.occupation(&submission.occupation_id)?.is_none() {
            return Err(CandidateServiceError::OccupationNotFound);
        }

        let mut record = self.load_or_create(id)?;
        self.guard
            .validate_target(&record.targets, &submission.occupation_id, submission.priority)?;

        record.targets.push(OccupationTarget {
            occupation_id: submission.occupation_id,
            priority: submission.priority,
        });
        record.mark_stats_dirty();
        record
            .onboarding
            .raise_score(OnboardingStep::Targets.completion_score());
        self.store.update(record.clone())?;
        Ok(Self::status_view(&record))
    }

    pub fn remove_target(
        &self,
        id: &CandidateId,
        occupation_id: &OccupationId,
    ) -> Result<OnboardingStatusView, CandidateServiceError> {
        let mut record = self.load_or_create(id)?;
        let before = record.targets.len();
        record
            .targets
            .retain(|target| &target.occupation_id != occupation_id);
        if record.targets.len() != before {
            record.mark_stats_dirty();
        }
        self.store.update(record.clone())?;
        Ok(Self::status_view(&record))
    }

    /// The quick onboarding assessment: a priority-weighted selection across
    /// the candidate's targets, reshuffled on every call. No targets yields
    /// an empty question list.
    pub fn onboarding_assessment(
        &self,
        id: &CandidateId,
    ) -> Result<QuickAssessment, CandidateServiceError> {
        let record = self.load_or_create(id)?;
        let resolved = self.resolve_targets(&record)?;

        let mut rng = StdRng::from_entropy();
        let questions = select_quick_tasks(&resolved, &mut rng)
            .into_iter()
            .map(AssessmentQuestion::from)
            .collect();

        Ok(QuickAssessment {
            candidate_id: record.candidate_id,
            questions,
        })
    }

    /// Process a quick-assessment submission: upsert known tasks, complete
    /// onboarding regardless of how many questions were answered.
    pub fn submit_onboarding_assessment(
        &self,
        id: &CandidateId,
        responses: Vec<ResponseSubmission>,
    ) -> Result<OnboardingStatusView, CandidateServiceError> {
        let mut record = self.load_or_create(id)?;
        self.upsert_responses(&mut record, responses, None)?;
        record.mark_stats_dirty();

        let completed = record
            .onboarding
            .raise_score(OnboardingStep::Assessment.completion_score());
        self.store.update(record.clone())?;

        if completed && record.onboarding.is_onboarded {
            info!(candidate = %record.candidate_id.0, "candidate completed onboarding");
            let mut details = BTreeMap::new();
            details.insert("score".to_string(), record.onboarding.score.to_string());
            self.notifier.publish(CandidateNotification {
                template: "candidate_onboarded".to_string(),
                candidate_id: record.candidate_id.clone(),
                details,
            })?;
        }

        Ok(Self::status_view(&record))
    }

    /// The comprehensive per-occupation assessment sheet. The task subset is
    /// deterministic per (candidate, occupation) and existing responses are
    /// attached for form pre-fill.
    pub fn occupation_assessment(
        &self,
        id: &CandidateId,
        occupation_id: &OccupationId,
    ) -> Result<AssessmentSheet, CandidateServiceError> {
        let occupation = self
            .catalog
            .occupation(occupation_id)?
            .ok_or(CandidateServiceError::OccupationNotFound)?;
        let record = self.load_or_create(id)?;

        let tasks = select_comprehensive_tasks(
            &record.candidate_id,
            &occupation,
            self.aggregator.engine().config(),
        );
        let is_target = record
            .targets
            .iter()
            .any(|target| &target.occupation_id == occupation_id);

        Ok(AssessmentSheet::assemble(
            &occupation,
            tasks,
            &record.responses,
            is_target,
        ))
    }

    /// Upsert responses for one occupation's comprehensive assessment and
    /// mark statistics for recomputation. Does not change the onboarding
    /// score.
    pub fn submit_occupation_assessment(
        &self,
        id: &CandidateId,
        occupation_id: &OccupationId,
        responses: Vec<ResponseSubmission>,
    ) -> Result<AssessmentSheet, CandidateServiceError> {
        let occupation = self
            .catalog
            .occupation(occupation_id)?
            .ok_or(CandidateServiceError::OccupationNotFound)?;

        let mut record = self.load_or_create(id)?;
        self.upsert_responses(&mut record, responses, Some(&occupation.id))?;
        record.mark_stats_dirty();
        self.store.update(record.clone())?;

        let tasks = select_comprehensive_tasks(
            &record.candidate_id,
            &occupation,
            self.aggregator.engine().config(),
        );
        let is_target = record
            .targets
            .iter()
            .any(|target| &target.occupation_id == occupation_id);

        Ok(AssessmentSheet::assemble(
            &occupation,
            tasks,
            &record.responses,
            is_target,
        ))
    }

    /// Recompute the cached statistics now, regardless of the dirty flag.
    pub fn recompute_stats(
        &self,
        id: &CandidateId,
        now: DateTime<Utc>,
    ) -> Result<CandidateStats, CandidateServiceError> {
        let mut record = self.load_or_create(id)?;
        let stats = self
            .aggregator
            .recompute(&record, self.catalog.as_ref(), now)?;
        stats.clone().apply(&mut record.profile);
        self.store.update(record)?;
        Ok(stats)
    }

    /// Dashboard read: recompute first if the cached statistics are stale,
    /// then serve the cached fields.
    pub fn dashboard(
        &self,
        id: &CandidateId,
        now: DateTime<Utc>,
    ) -> Result<DashboardView, CandidateServiceError> {
        let mut record = self.load_or_create(id)?;

        if record.profile.stats_update_needed {
            let stats = self
                .aggregator
                .recompute(&record, self.catalog.as_ref(), now)?;
            stats.apply(&mut record.profile);
            self.store.update(record.clone())?;
        }

        Ok(DashboardView {
            candidate_id: record.candidate_id.clone(),
            score: record.onboarding.score,
            active_step: record.onboarding.active_step().label(),
            is_onboarded: record.onboarding.is_onboarded,
            highest_nqf_level: record.profile.highest_nqf_level.clone(),
            occupation_matches_count: record.profile.occupation_matches_count,
            assessment_progress: record.profile.assessment_progress.clone(),
            recommended_occupations: record.profile.recommended_occupations.clone(),
            stats_last_computed: record.profile.stats_last_computed,
        })
    }

    /// Batch refresh for candidates flagged dirty; returns how many were
    /// recomputed.
    pub fn refresh_pending(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<usize, CandidateServiceError> {
        let pending = self.store.dirty(limit)?;
        let count = pending.len();
        for mut record in pending {
            let stats = self
                .aggregator
                .recompute(&record, self.catalog.as_ref(), now)?;
            stats.apply(&mut record.profile);
            self.store.update(record)?;
        }
        Ok(count)
    }

    fn resolve_targets(
        &self,
        record: &CandidateRecord,
    ) -> Result<Vec<ResolvedTarget>, CandidateServiceError> {
        let mut resolved = Vec::with_capacity(record.targets.len());
        for target in &record.targets {
            match self.catalog.occupation(&target.occupation_id)? {
                Some(occupation) => resolved.push(ResolvedTarget {
                    occupation,
                    priority: target.priority,
                }),
                None => {
                    warn!(
                        candidate = %record.candidate_id.0,
                        occupation = %target.occupation_id.0,
                        "skipping target with missing occupation"
                    );
                }
            }
        }
        Ok(resolved)
    }

    fn upsert_responses(
        &self,
        record: &mut CandidateRecord,
        responses: Vec<ResponseSubmission>,
        restrict_to: Option<&OccupationId>,
    ) -> Result<(), CandidateServiceError> {
        for submission in responses {
            let task = self.catalog.task(&submission.task_id)?;
            let known = match (&task, restrict_to) {
                (Some(_), None) => true,
                (Some(_), Some(occupation_id)) => self
                    .catalog
                    .occupation(occupation_id)?
                    .map(|occupation| {
                        occupation
                            .tasks
                            .iter()
                            .any(|candidate_task| candidate_task.id == submission.task_id)
                    })
                    .unwrap_or(false),
                (None, _) => false,
            };

            if known {
                record
                    .responses
                    .insert(submission.task_id, submission.response);
            } else {
                warn!(
                    candidate = %record.candidate_id.0,
                    task = %submission.task_id.0,
                    "discarding response for unknown task"
                );
            }
        }
        Ok(())
    }
}
