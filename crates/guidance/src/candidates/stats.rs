//! Candidate statistics aggregation.
//!
//! The cached profile fields are a materialized view over the candidate's
//! education, experience, targets, and assessment responses. The aggregator
//! recomputes the whole view on demand; it is the only writer of the cached
//! fields and is idempotent for unchanged inputs.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{AssessmentProgress, CandidateProfile, ProficiencyEntry};
use super::repository::CandidateRecord;
use super::scoring::ProficiencyEngine;
use crate::content::{CatalogError, ContentCatalog, Occupation, OfoCode};

/// Total number of proficiency entries the recommendation fill tops up to.
pub const RECOMMENDATION_LIMIT: usize = 5;

/// Sentinel label used when a candidate has no education records.
pub const NO_NQF_LABEL: &str = "None";

/// The recomputed view, ready to be applied to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateStats {
    pub highest_nqf_level: String,
    pub occupation_matches_count: u32,
    pub assessment_progress: BTreeMap<OfoCode, AssessmentProgress>,
    pub recommended_occupations: Vec<ProficiencyEntry>,
    pub computed_at: DateTime<Utc>,
}

impl CandidateStats {
    /// Write the cached fields, clear the dirty flag, stamp the timestamp.
    pub fn apply(self, profile: &mut CandidateProfile) {
        profile.highest_nqf_level = self.highest_nqf_level;
        profile.occupation_matches_count = self.occupation_matches_count;
        profile.assessment_progress = self.assessment_progress;
        profile.recommended_occupations = self.recommended_occupations;
        profile.stats_update_needed = false;
        profile.stats_last_computed = Some(self.computed_at);
    }
}

/// Orchestrates the proficiency engine across a candidate's targets and
/// industry-based recommendations.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    engine: ProficiencyEngine,
}

impl StatsAggregator {
    pub fn new(engine: ProficiencyEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ProficiencyEngine {
        &self.engine
    }

    /// Recompute the full statistics view from already-loaded records.
    /// A target whose occupation is missing from the catalog is skipped,
    /// never an abort.
    pub fn recompute<C: ContentCatalog>(
        &self,
        record: &CandidateRecord,
        catalog: &C,
        now: DateTime<Utc>,
    ) -> Result<CandidateStats, CatalogError> {
        let today = now.date_naive();
        let history = record.history();

        let highest_nqf_level = record
            .education
            .iter()
            .max_by_key(|entry| entry.level.nqf_level())
            .map(|entry| format!("NQF {} - {}", entry.level.nqf_level(), entry.level.label()))
            .unwrap_or_else(|| NO_NQF_LABEL.to_string());

        // Resolve targets in priority order, then OFO code within a priority.
        let mut resolved: Vec<(&super::domain::OccupationTarget, Occupation)> = Vec::new();
        for target in &record.targets {
            match catalog.occupation(&target.occupation_id)? {
                Some(occupation) => resolved.push((target, occupation)),
                None => {
                    warn!(
                        candidate = %record.candidate_id.0,
                        occupation = %target.occupation_id.0,
                        "skipping target with missing occupation"
                    );
                }
            }
        }
        resolved.sort_by(|(a, occ_a), (b, occ_b)| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| occ_a.code.cmp(&occ_b.code))
        });

        let occupation_matches_count = resolved.len() as u32;

        let mut assessment_progress = BTreeMap::new();
        let mut target_industries = BTreeSet::new();
        let mut target_ids = BTreeSet::new();
        let mut entries = Vec::new();

        for (_, occupation) in &resolved {
            target_ids.insert(occupation.id.clone());
            if let Some(industry) = &occupation.industry {
                target_industries.insert(industry.code.clone());
            }

            assessment_progress.insert(
                occupation.code.clone(),
                self.progress_for(record, occupation),
            );

            let outcome = self.engine.score(&history, occupation, today);
            entries.push(ProficiencyEntry {
                code: occupation.code.clone(),
                title: occupation.title.clone(),
                score: outcome.total,
                industry: occupation.industry.as_ref().map(|i| i.name.clone()),
                is_target: true,
                occupation_id: occupation.id.clone(),
            });
        }

        // Top up with occupations from the same industries, scored with the
        // same engine so the preview is meaningful before the candidate opts
        // in.
        if !target_industries.is_empty() && entries.len() < RECOMMENDATION_LIMIT {
            let suggestions = catalog.related_by_industry(
                &target_industries,
                &target_ids,
                RECOMMENDATION_LIMIT - entries.len(),
            )?;
            for occupation in suggestions {
                let outcome = self.engine.score(&history, &occupation, today);
                entries.push(ProficiencyEntry {
                    code: occupation.code.clone(),
                    title: occupation.title.clone(),
                    score: outcome.total,
                    industry: occupation.industry.as_ref().map(|i| i.name.clone()),
                    is_target: false,
                    occupation_id: occupation.id,
                });
            }
        }

        Ok(CandidateStats {
            highest_nqf_level,
            occupation_matches_count,
            assessment_progress,
            recommended_occupations: entries,
            computed_at: now,
        })
    }

    fn progress_for(&self, record: &CandidateRecord, occupation: &Occupation) -> AssessmentProgress {
        let required = self
            .engine
            .config()
            .required_task_count(occupation.tasks.len()) as u32;
        let answered = occupation
            .tasks
            .iter()
            .filter(|task| record.responses.contains_key(&task.id))
            .count() as u32;
        let percentage = if required > 0 {
            (f64::from(answered) / f64::from(required) * 100.0).round().min(100.0) as u8
        } else {
            0
        };

        AssessmentProgress {
            title: occupation.title.clone(),
            answered,
            total: required,
            percentage,
            occupation_id: occupation.id.clone(),
        }
    }
}
