use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{OccupationId, OfoCode, TaskId};

/// Identifier wrapper for candidates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Basic identity details captured during the first onboarding step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDetails {
    pub first_name: String,
    pub last_name: String,
}

/// Per-candidate profile carrying the cached statistics the stats aggregator
/// maintains. The cached fields are only ever written by the aggregator;
/// every write to a child record flips `stats_update_needed` back on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub identity: Option<IdentityDetails>,
    pub highest_nqf_level: String,
    pub occupation_matches_count: u32,
    pub recommended_occupations: Vec<ProficiencyEntry>,
    pub assessment_progress: BTreeMap<OfoCode, AssessmentProgress>,
    pub stats_update_needed: bool,
    pub stats_last_computed: Option<DateTime<Utc>>,
}

impl Default for CandidateProfile {
    fn default() -> Self {
        Self {
            identity: None,
            highest_nqf_level: String::new(),
            occupation_matches_count: 0,
            recommended_occupations: Vec::new(),
            assessment_progress: BTreeMap::new(),
            stats_update_needed: true,
            stats_last_computed: None,
        }
    }
}

/// Education levels and their fixed NQF mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    Matric,
    Certificate,
    Diploma,
    Degree,
    Honors,
    Masters,
    Doctorate,
}

impl EducationLevel {
    pub const fn nqf_level(self) -> u8 {
        match self {
            EducationLevel::Matric => 4,
            EducationLevel::Certificate => 5,
            EducationLevel::Diploma => 6,
            EducationLevel::Degree => 7,
            EducationLevel::Honors => 8,
            EducationLevel::Masters => 9,
            EducationLevel::Doctorate => 10,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EducationLevel::Matric => "Matric (Grade 12)",
            EducationLevel::Certificate => "Certificate",
            EducationLevel::Diploma => "Diploma",
            EducationLevel::Degree => "Bachelor's Degree",
            EducationLevel::Honors => "Honours Degree",
            EducationLevel::Masters => "Master's Degree",
            EducationLevel::Doctorate => "Doctorate",
        }
    }
}

/// One entry of a candidate's education history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub id: String,
    pub level: EducationLevel,
    pub institution: String,
    pub field_of_study: String,
    pub year_completed: u16,
}

/// One entry of a candidate's work history. An open-ended position has no
/// end date and accrues experience up to "today".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperienceRecord {
    pub id: String,
    pub job_title: String,
    pub company: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl WorkExperienceRecord {
    /// Duration of the position in years, one decimal place.
    pub fn years_experience(&self, today: NaiveDate) -> f64 {
        let end = self.end_date.unwrap_or(today);
        let days = (end - self.start_date).num_days();
        (days as f64 / 365.25 * 10.0).round() / 10.0
    }
}

/// Target priority. Each priority is a mutually exclusive slot, so a
/// candidate carries at most three targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPriority {
    High,
    Medium,
    Low,
}

impl TargetPriority {
    /// Slot order used for display and aggregation ordering.
    pub const fn rank(self) -> u8 {
        match self {
            TargetPriority::High => 1,
            TargetPriority::Medium => 2,
            TargetPriority::Low => 3,
        }
    }

    /// Weight used when allocating quick-assessment questions.
    pub const fn question_weight(self) -> u32 {
        match self {
            TargetPriority::High => 3,
            TargetPriority::Medium => 2,
            TargetPriority::Low => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TargetPriority::High => "High Priority",
            TargetPriority::Medium => "Medium Priority",
            TargetPriority::Low => "Low Priority",
        }
    }
}

/// An occupation a candidate has expressed interest in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationTarget {
    pub occupation_id: OccupationId,
    pub priority: TargetPriority,
}

/// A candidate's answer to an assessment task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseRating {
    Yes,
    Partially,
    No,
}

impl ResponseRating {
    pub const fn weight(self) -> f64 {
        match self {
            ResponseRating::Yes => 1.0,
            ResponseRating::Partially => 0.5,
            ResponseRating::No => 0.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ResponseRating::Yes => "Yes, I have done this",
            ResponseRating::Partially => "Partially / Sometimes",
            ResponseRating::No => "No, never",
        }
    }
}

/// Cached per-target assessment progress, measured against the required
/// (80% coverage) task count rather than the raw task count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentProgress {
    pub title: String,
    pub answered: u32,
    pub total: u32,
    pub percentage: u8,
    pub occupation_id: OccupationId,
}

/// One cached proficiency entry: a target occupation or an industry-based
/// recommendation, with the composite score either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProficiencyEntry {
    pub code: OfoCode,
    pub title: String,
    pub score: u8,
    pub industry: Option<String>,
    pub is_target: bool,
    pub occupation_id: OccupationId,
}

/// Responses keyed by task id; a later write for the same task replaces the
/// earlier one, which gives the "at most one response per candidate+task"
/// contract by construction.
pub type ResponseMap = BTreeMap<TaskId, ResponseRating>;
