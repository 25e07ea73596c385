//! Assessment task selection.
//!
//! Two modes: the quick onboarding assessment draws a priority-weighted,
//! freshly randomized handful of questions across all targets, while the
//! comprehensive per-occupation assessment selects the required 80% subset
//! deterministically so a candidate sees the same questions across sessions.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, ResponseMap, ResponseRating, TargetPriority};
use super::scoring::ScoringConfig;
use crate::content::{Occupation, OccupationId, OccupationTask, OfoCode, TaskId};

/// Question budget for the quick onboarding assessment.
pub const MAX_QUICK_QUESTIONS: usize = 5;

/// A target resolved through the catalog, ready for task selection.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub occupation: Occupation,
    pub priority: TargetPriority,
}

/// Question count allocated to one target, carrying the target's index in
/// the caller's slice. Shares are returned in weight-sorted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionShare {
    pub target_index: usize,
    pub priority: TargetPriority,
    pub count: usize,
}

/// Distribute the question budget across targets proportionally to their
/// priority weights (high 3, medium 2, low 1).
///
/// The first pass truncates each proportional share, which under-allocates;
/// the remainder is then handed out round-robin over the weight-sorted list
/// so higher priorities absorb the leftovers first. With at least one
/// target the counts always sum to [`MAX_QUICK_QUESTIONS`].
pub fn allocate_question_counts(priorities: &[TargetPriority]) -> Vec<QuestionShare> {
    if priorities.is_empty() {
        return Vec::new();
    }

    let mut shares: Vec<QuestionShare> = priorities
        .iter()
        .enumerate()
        .map(|(target_index, priority)| QuestionShare {
            target_index,
            priority: *priority,
            count: 0,
        })
        .collect();

    // Stable sort: ties keep original order.
    shares.sort_by(|a, b| b.priority.question_weight().cmp(&a.priority.question_weight()));

    let total_weight: u32 = shares
        .iter()
        .map(|share| share.priority.question_weight())
        .sum();

    let mut remaining = MAX_QUICK_QUESTIONS;
    if total_weight > 0 {
        for share in &mut shares {
            let ideal = f64::from(share.priority.question_weight()) / f64::from(total_weight)
                * MAX_QUICK_QUESTIONS as f64;
            share.count = ideal.trunc() as usize;
            remaining -= share.count;
        }
    }

    let mut i = 0;
    let len = shares.len();
    while remaining > 0 {
        shares[i % len].count += 1;
        remaining -= 1;
        i += 1;
    }

    shares
}

/// Select the quick-assessment task set: per-target uniform draws without
/// replacement, concatenated and fully shuffled so presentation order does
/// not reveal which target a task came from. No targets yields an empty
/// list.
pub fn select_quick_tasks<R: Rng + ?Sized>(
    targets: &[ResolvedTarget],
    rng: &mut R,
) -> Vec<OccupationTask> {
    let priorities: Vec<TargetPriority> = targets.iter().map(|target| target.priority).collect();
    let shares = allocate_question_counts(&priorities);

    let mut tasks = Vec::new();
    for share in shares {
        if share.count == 0 {
            continue;
        }
        let pool = &targets[share.target_index].occupation.tasks;
        // Pools smaller than the requested count yield everything available.
        tasks.extend(pool.choose_multiple(rng, share.count).cloned());
    }

    tasks.shuffle(rng);
    tasks
}

fn comprehensive_seed(candidate_id: &CandidateId, occupation_id: &OccupationId) -> u64 {
    let mut hasher = DefaultHasher::new();
    candidate_id.0.hash(&mut hasher);
    occupation_id.0.hash(&mut hasher);
    hasher.finish()
}

/// Select the comprehensive assessment subset for one occupation: the
/// required (80%) task count, drawn from a locally constructed generator
/// seeded from the (candidate, occupation) pair. The same pair always
/// produces the same subset; no shared random state is read or written.
pub fn select_comprehensive_tasks(
    candidate_id: &CandidateId,
    occupation: &Occupation,
    config: &ScoringConfig,
) -> Vec<OccupationTask> {
    let total = occupation.tasks.len();
    if total == 0 {
        return Vec::new();
    }

    let required = config.required_task_count(total);
    if total <= required {
        return occupation.tasks.clone();
    }

    let mut rng = StdRng::seed_from_u64(comprehensive_seed(candidate_id, &occupation.id));
    let mut tasks: Vec<OccupationTask> = occupation
        .tasks
        .choose_multiple(&mut rng, required)
        .cloned()
        .collect();
    tasks.shuffle(&mut rng);
    tasks
}

/// One question in the quick onboarding assessment. The source target is
/// deliberately not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
}

impl From<OccupationTask> for AssessmentQuestion {
    fn from(task: OccupationTask) -> Self {
        Self {
            task_id: task.id,
            title: task.title,
            description: task.description,
        }
    }
}

/// One question on a comprehensive assessment sheet, pre-filled with any
/// existing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetQuestion {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
    pub existing_response: Option<ResponseRating>,
}

/// The comprehensive per-occupation assessment view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSheet {
    pub occupation_id: OccupationId,
    pub code: OfoCode,
    pub title: String,
    pub is_target: bool,
    pub questions: Vec<SheetQuestion>,
    pub answered: u32,
    pub total: u32,
    pub completion_percentage: u8,
}

impl AssessmentSheet {
    /// Assemble the sheet for a deterministic task subset, attaching any
    /// responses already recorded for form pre-fill.
    pub fn assemble(
        occupation: &Occupation,
        tasks: Vec<OccupationTask>,
        responses: &ResponseMap,
        is_target: bool,
    ) -> Self {
        let questions: Vec<SheetQuestion> = tasks
            .into_iter()
            .map(|task| SheetQuestion {
                existing_response: responses.get(&task.id).copied(),
                task_id: task.id,
                title: task.title,
                description: task.description,
            })
            .collect();

        let answered = questions
            .iter()
            .filter(|question| question.existing_response.is_some())
            .count() as u32;
        let total = questions.len() as u32;
        let completion_percentage = if total > 0 {
            (f64::from(answered) / f64::from(total) * 100.0).trunc() as u8
        } else {
            0
        };

        Self {
            occupation_id: occupation.id.clone(),
            code: occupation.code.clone(),
            title: occupation.title.clone(),
            is_target,
            questions,
            answered,
            total,
            completion_percentage,
        }
    }
}
