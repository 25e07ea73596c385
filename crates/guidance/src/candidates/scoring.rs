//! Composite proficiency scoring for a (candidate, occupation) pair.
//!
//! Three weighted factors: assessment responses against the required 80%
//! task coverage, total years of work experience against the occupation's
//! requirement, and the candidate's highest NQF level against the
//! occupation's preference. Every branch carries an explicit fallback for
//! missing data, so scoring is total over its inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{EducationRecord, ResponseMap, WorkExperienceRecord};
use crate::content::{Occupation, OccupationId};

/// Scoring weights and coverage. The default weights are the contract:
/// assessment 0.50, experience 0.30, qualification 0.20; they sum to 1.0
/// and must not be rebalanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub assessment_weight: f64,
    pub experience_weight: f64,
    pub qualification_weight: f64,
    /// Share of an occupation's tasks a candidate is actually asked to
    /// answer. Assessments cover 80% of tasks, not all of them.
    pub task_coverage: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            assessment_weight: 0.50,
            experience_weight: 0.30,
            qualification_weight: 0.20,
            task_coverage: 0.80,
        }
    }
}

impl ScoringConfig {
    /// Number of tasks required for full assessment credit: 80% of the
    /// occupation's tasks, floored, never less than one.
    pub fn required_task_count(&self, total_tasks: usize) -> usize {
        ((total_tasks as f64) * self.task_coverage).floor().max(1.0) as usize
    }
}

/// Borrowed view over the candidate records the engine consumes.
#[derive(Debug, Clone, Copy)]
pub struct CandidateHistory<'a> {
    pub education: &'a [EducationRecord],
    pub experience: &'a [WorkExperienceRecord],
    pub responses: &'a ResponseMap,
}

impl<'a> CandidateHistory<'a> {
    /// Highest NQF level across the education history, 0 with no records.
    pub fn highest_nqf(&self) -> u8 {
        self.education
            .iter()
            .map(|record| record.level.nqf_level())
            .max()
            .unwrap_or(0)
    }

    /// Total years of experience; each record is rounded to one decimal
    /// before summing.
    pub fn total_years_experience(&self, today: NaiveDate) -> f64 {
        self.experience
            .iter()
            .map(|record| record.years_experience(today))
            .sum()
    }
}

/// The factor a score component contributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Assessment,
    Experience,
    Qualification,
}

/// Discrete contribution to a proficiency outcome, allowing transparent
/// audits of how the composite was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub value: f64,
    pub notes: String,
}

/// Composite score for one (candidate, occupation) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProficiencyOutcome {
    pub occupation_id: OccupationId,
    pub total: u8,
    pub components: Vec<ScoreComponent>,
}

/// Stateless engine applying the scoring configuration.
#[derive(Debug, Clone, Default)]
pub struct ProficiencyEngine {
    config: ScoringConfig,
}

impl ProficiencyEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Compute the 0–100 composite proficiency score.
    pub fn score(
        &self,
        history: &CandidateHistory<'_>,
        occupation: &Occupation,
        today: NaiveDate,
    ) -> ProficiencyOutcome {
        let assessment = self.assessment_score(history, occupation);
        let experience = self.experience_score(history, occupation, today);
        let qualification = self.qualification_score(history, occupation);

        let total = assessment.value * self.config.assessment_weight
            + experience.value * self.config.experience_weight
            + qualification.value * self.config.qualification_weight;

        ProficiencyOutcome {
            occupation_id: occupation.id.clone(),
            // Truncated toward zero, not rounded.
            total: total.trunc() as u8,
            components: vec![assessment, experience, qualification],
        }
    }

    fn assessment_score(
        &self,
        history: &CandidateHistory<'_>,
        occupation: &Occupation,
    ) -> ScoreComponent {
        let total_tasks = occupation.tasks.len();
        if total_tasks == 0 {
            return ScoreComponent {
                factor: ScoreFactor::Assessment,
                value: 0.0,
                notes: "occupation has no assessable tasks".to_string(),
            };
        }

        let required = self.config.required_task_count(total_tasks);
        let weighted_sum: f64 = occupation
            .tasks
            .iter()
            .filter_map(|task| history.responses.get(&task.id))
            .map(|rating| rating.weight())
            .sum();

        // Answering the required subset perfectly scores 100; extra answers
        // are capped, not over-credited.
        let value = (weighted_sum / required as f64 * 100.0).min(100.0);
        ScoreComponent {
            factor: ScoreFactor::Assessment,
            value,
            notes: format!("weighted responses {weighted_sum:.1} against {required} required tasks"),
        }
    }

    fn experience_score(
        &self,
        history: &CandidateHistory<'_>,
        occupation: &Occupation,
        today: NaiveDate,
    ) -> ScoreComponent {
        let total_years = history.total_years_experience(today);
        let required_years = occupation.years_of_experience;

        if required_years == 0 {
            let value = if total_years > 0.0 { 100.0 } else { 50.0 };
            return ScoreComponent {
                factor: ScoreFactor::Experience,
                value,
                notes: format!("entry-level occupation, {total_years:.1} years shown"),
            };
        }

        let value = (total_years / required_years as f64).min(1.0) * 100.0;
        ScoreComponent {
            factor: ScoreFactor::Experience,
            value,
            notes: format!("{total_years:.1} of {required_years} required years"),
        }
    }

    fn qualification_score(
        &self,
        history: &CandidateHistory<'_>,
        occupation: &Occupation,
    ) -> ScoreComponent {
        let candidate_nqf = history.highest_nqf();
        let preferred = occupation.preferred_nqf_level;

        let (value, notes) = if preferred == 0 {
            let value = if candidate_nqf > 0 { 100.0 } else { 50.0 };
            (value, format!("no NQF preference, candidate NQF {candidate_nqf}"))
        } else if candidate_nqf >= preferred {
            (100.0, format!("candidate NQF {candidate_nqf} meets preferred {preferred}"))
        } else if candidate_nqf > 0 {
            // 20 points per missing NQF level, floored at zero.
            let value = (100.0 - f64::from(preferred - candidate_nqf) * 20.0).max(0.0);
            (value, format!("candidate NQF {candidate_nqf} below preferred {preferred}"))
        } else {
            (10.0, format!("no education records, preferred NQF {preferred}"))
        };

        ScoreComponent {
            factor: ScoreFactor::Qualification,
            value,
            notes,
        }
    }
}
