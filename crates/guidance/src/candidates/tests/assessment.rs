use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::common::*;
use crate::candidates::assessment::{
    allocate_question_counts, select_comprehensive_tasks, select_quick_tasks, AssessmentSheet,
    ResolvedTarget, MAX_QUICK_QUESTIONS,
};
use crate::candidates::domain::{CandidateId, ResponseRating, TargetPriority};
use crate::candidates::scoring::ScoringConfig;
use crate::content::TaskId;

fn counts_by_priority(priorities: &[TargetPriority]) -> BTreeMap<TargetPriority, usize> {
    allocate_question_counts(priorities)
        .into_iter()
        .map(|share| (share.priority, share.count))
        .collect()
}

#[test]
fn three_priorities_allocate_three_two_zero() {
    let counts = counts_by_priority(&[
        TargetPriority::High,
        TargetPriority::Medium,
        TargetPriority::Low,
    ]);

    assert_eq!(counts[&TargetPriority::High], 3);
    assert_eq!(counts[&TargetPriority::Medium], 2);
    assert_eq!(counts[&TargetPriority::Low], 0);
}

#[test]
fn single_target_takes_the_whole_budget() {
    let counts = counts_by_priority(&[TargetPriority::Medium]);
    assert_eq!(counts[&TargetPriority::Medium], MAX_QUICK_QUESTIONS);
}

#[test]
fn two_targets_split_exactly() {
    let counts = counts_by_priority(&[TargetPriority::High, TargetPriority::Medium]);
    assert_eq!(counts[&TargetPriority::High], 3);
    assert_eq!(counts[&TargetPriority::Medium], 2);
}

#[test]
fn allocation_always_sums_to_the_budget() {
    let combos: Vec<Vec<TargetPriority>> = vec![
        vec![TargetPriority::Low],
        vec![TargetPriority::Low, TargetPriority::Medium],
        vec![TargetPriority::High, TargetPriority::Low],
        vec![
            TargetPriority::Medium,
            TargetPriority::Low,
            TargetPriority::High,
        ],
    ];

    for priorities in combos {
        let total: usize = allocate_question_counts(&priorities)
            .iter()
            .map(|share| share.count)
            .sum();
        assert_eq!(total, MAX_QUICK_QUESTIONS, "combo {priorities:?}");
    }
}

#[test]
fn no_targets_allocates_nothing() {
    assert!(allocate_question_counts(&[]).is_empty());
}

#[test]
fn quick_selection_draws_without_replacement() {
    let targets = vec![
        ResolvedTarget {
            occupation: project_manager(),
            priority: TargetPriority::High,
        },
        ResolvedTarget {
            occupation: infrastructure_manager(),
            priority: TargetPriority::Medium,
        },
    ];

    let mut rng = StdRng::seed_from_u64(7);
    let tasks = select_quick_tasks(&targets, &mut rng);

    assert_eq!(tasks.len(), MAX_QUICK_QUESTIONS);
    let unique: BTreeSet<TaskId> = tasks.iter().map(|task| task.id.clone()).collect();
    assert_eq!(unique.len(), tasks.len());
}

#[test]
fn quick_selection_tolerates_small_task_pools() {
    let targets = vec![
        ResolvedTarget {
            occupation: occupation("occ-tiny", "133110", "Tiny Occupation", 1, 4, 1),
            priority: TargetPriority::High,
        },
        ResolvedTarget {
            occupation: project_manager(),
            priority: TargetPriority::Medium,
        },
    ];

    let mut rng = StdRng::seed_from_u64(11);
    let tasks = select_quick_tasks(&targets, &mut rng);

    // The tiny pool contributes its single task; the shortfall is not
    // backfilled from the other target.
    assert_eq!(tasks.len(), 3);
}

#[test]
fn quick_selection_with_no_targets_is_empty() {
    let mut rng = StdRng::seed_from_u64(3);
    assert!(select_quick_tasks(&[], &mut rng).is_empty());
}

#[test]
fn comprehensive_selection_is_deterministic_per_pair() {
    let candidate = CandidateId("cand-determinism".to_string());
    let occupation = infrastructure_manager();
    let config = ScoringConfig::default();

    let first = select_comprehensive_tasks(&candidate, &occupation, &config);
    let second = select_comprehensive_tasks(&candidate, &occupation, &config);

    assert_eq!(first, second);
    assert_eq!(first.len(), config.required_task_count(occupation.tasks.len()));
}

#[test]
fn comprehensive_selection_varies_across_occupations() {
    let candidate = CandidateId("cand-variety".to_string());
    let config = ScoringConfig::default();

    let first: Vec<TaskId> =
        select_comprehensive_tasks(&candidate, &infrastructure_manager(), &config)
            .into_iter()
            .map(|task| task.id)
            .collect();
    let second: Vec<TaskId> = select_comprehensive_tasks(&candidate, &senior_manager(), &config)
        .into_iter()
        .map(|task| task.id)
        .collect();

    assert_ne!(first, second);
}

#[test]
fn comprehensive_selection_returns_everything_for_small_pools() {
    let candidate = CandidateId("cand-small".to_string());
    let occupation = occupation("occ-one", "133111", "One Task", 1, 4, 1);
    let config = ScoringConfig::default();

    let tasks = select_comprehensive_tasks(&candidate, &occupation, &config);

    assert_eq!(tasks, occupation.tasks);
}

#[test]
fn sheet_counts_answers_and_truncates_completion() {
    let occupation = project_manager();
    let tasks = occupation.tasks.clone();
    let mut responses = BTreeMap::new();
    responses.insert(tasks[0].id.clone(), ResponseRating::Yes);

    let sheet = AssessmentSheet::assemble(&occupation, tasks, &responses, true);

    assert_eq!(sheet.answered, 1);
    assert_eq!(sheet.total, 6);
    // 1/6 is 16.67%, truncated.
    assert_eq!(sheet.completion_percentage, 16);
    assert!(sheet.is_target);
    assert_eq!(
        sheet.questions[0].existing_response,
        Some(ResponseRating::Yes)
    );
    assert!(sheet.questions[1].existing_response.is_none());
}

#[test]
fn empty_sheet_reports_zero_completion() {
    let occupation = occupation("occ-empty", "999998", "Taskless", 0, 0, 0);
    let sheet = AssessmentSheet::assemble(&occupation, Vec::new(), &BTreeMap::new(), false);

    assert_eq!(sheet.total, 0);
    assert_eq!(sheet.completion_percentage, 0);
}
