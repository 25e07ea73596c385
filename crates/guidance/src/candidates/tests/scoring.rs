use std::collections::BTreeMap;

use chrono::NaiveDate;
use proptest::prelude::*;

use super::common::*;
use crate::candidates::domain::{
    EducationLevel, EducationRecord, ResponseRating, WorkExperienceRecord,
};
use crate::candidates::scoring::{
    CandidateHistory, ProficiencyEngine, ScoreFactor, ScoringConfig,
};
use crate::content::TaskId;

fn engine() -> ProficiencyEngine {
    ProficiencyEngine::new(ScoringConfig::default())
}

fn component(outcome: &crate::candidates::scoring::ProficiencyOutcome, factor: ScoreFactor) -> f64 {
    outcome
        .components
        .iter()
        .find(|component| component.factor == factor)
        .map(|component| component.value)
        .expect("component present")
}

#[test]
fn required_task_count_floors_at_one() {
    let config = ScoringConfig::default();
    assert_eq!(config.required_task_count(0), 1);
    assert_eq!(config.required_task_count(1), 1);
    assert_eq!(config.required_task_count(6), 4);
    assert_eq!(config.required_task_count(9), 7);
    assert_eq!(config.required_task_count(13), 10);
}

#[test]
fn degree_holder_with_three_years_scores_88() {
    let occupation = project_manager();
    let education = vec![degree_record("edu-1")];
    let experience = vec![three_year_position("exp-1")];
    let mut responses = BTreeMap::new();
    for task in occupation.tasks.iter().take(4) {
        responses.insert(task.id.clone(), ResponseRating::Yes);
    }
    responses.insert(occupation.tasks[4].id.clone(), ResponseRating::Partially);

    let history = CandidateHistory {
        education: &education,
        experience: &experience,
        responses: &responses,
    };

    let outcome = engine().score(&history, &occupation, today());

    assert_eq!(component(&outcome, ScoreFactor::Assessment), 100.0);
    assert_eq!(component(&outcome, ScoreFactor::Experience), 60.0);
    assert_eq!(component(&outcome, ScoreFactor::Qualification), 100.0);
    assert_eq!(outcome.total, 88);
}

#[test]
fn assessment_caps_at_100_for_over_answering() {
    let occupation = project_manager();
    let mut responses = BTreeMap::new();
    for task in &occupation.tasks {
        responses.insert(task.id.clone(), ResponseRating::Yes);
    }
    let history = CandidateHistory {
        education: &[],
        experience: &[],
        responses: &responses,
    };

    let outcome = engine().score(&history, &occupation, today());

    // 6 answered against 4 required would be 150 without the cap.
    assert_eq!(component(&outcome, ScoreFactor::Assessment), 100.0);
}

#[test]
fn assessment_scores_zero_for_taskless_occupation() {
    let occupation = occupation("occ-empty", "999999", "Taskless", 0, 0, 0);
    let responses = BTreeMap::new();
    let history = CandidateHistory {
        education: &[],
        experience: &[],
        responses: &responses,
    };

    let outcome = engine().score(&history, &occupation, today());

    assert_eq!(component(&outcome, ScoreFactor::Assessment), 0.0);
}

#[test]
fn entry_level_experience_rewards_any_history() {
    let occupation = occupation("occ-entry", "811101", "General Clerk", 0, 0, 4);
    let responses = BTreeMap::new();
    let experience = vec![three_year_position("exp-1")];

    let with_history = CandidateHistory {
        education: &[],
        experience: &experience,
        responses: &responses,
    };
    let without_history = CandidateHistory {
        education: &[],
        experience: &[],
        responses: &responses,
    };

    let outcome = engine().score(&with_history, &occupation, today());
    assert_eq!(component(&outcome, ScoreFactor::Experience), 100.0);

    let outcome = engine().score(&without_history, &occupation, today());
    assert_eq!(component(&outcome, ScoreFactor::Experience), 50.0);
}

#[test]
fn experience_ratio_caps_at_full_credit() {
    let occupation = occupation("occ-junior", "133105", "Junior PM", 2, 7, 4);
    let responses = BTreeMap::new();
    let experience = vec![three_year_position("exp-1")];
    let history = CandidateHistory {
        education: &[],
        experience: &experience,
        responses: &responses,
    };

    let outcome = engine().score(&history, &occupation, today());

    // 3.0 years against 2 required stays at 100, never 150.
    assert_eq!(component(&outcome, ScoreFactor::Experience), 100.0);
}

#[test]
fn open_ended_position_accrues_until_today() {
    let record = WorkExperienceRecord {
        id: "exp-open".to_string(),
        job_title: "Analyst".to_string(),
        company: "Mindworx".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        end_date: None,
    };

    assert_eq!(record.years_experience(today()), 1.0);
}

#[test]
fn qualification_without_preference_depends_on_any_education() {
    let occupation = occupation("occ-nopref", "811102", "Filing Clerk", 0, 0, 4);
    let responses = BTreeMap::new();
    let education = vec![degree_record("edu-1")];

    let with_education = CandidateHistory {
        education: &education,
        experience: &[],
        responses: &responses,
    };
    let without_education = CandidateHistory {
        education: &[],
        experience: &[],
        responses: &responses,
    };

    let outcome = engine().score(&with_education, &occupation, today());
    assert_eq!(component(&outcome, ScoreFactor::Qualification), 100.0);

    let outcome = engine().score(&without_education, &occupation, today());
    assert_eq!(component(&outcome, ScoreFactor::Qualification), 50.0);
}

#[test]
fn qualification_gap_costs_twenty_points_per_level() {
    let occupation = project_manager(); // prefers NQF 7
    let responses = BTreeMap::new();
    let education = vec![EducationRecord {
        id: "edu-matric".to_string(),
        level: EducationLevel::Matric, // NQF 4
        institution: "Settlers High".to_string(),
        field_of_study: "General".to_string(),
        year_completed: 2015,
    }];
    let history = CandidateHistory {
        education: &education,
        experience: &[],
        responses: &responses,
    };

    let outcome = engine().score(&history, &occupation, today());

    assert_eq!(component(&outcome, ScoreFactor::Qualification), 40.0);
}

#[test]
fn qualification_without_education_against_preference_scores_ten() {
    let occupation = project_manager();
    let responses = BTreeMap::new();
    let history = CandidateHistory {
        education: &[],
        experience: &[],
        responses: &responses,
    };

    let outcome = engine().score(&history, &occupation, today());

    assert_eq!(component(&outcome, ScoreFactor::Qualification), 10.0);
}

#[test]
fn highest_nqf_picks_the_best_record() {
    let education = vec![
        EducationRecord {
            id: "edu-1".to_string(),
            level: EducationLevel::Matric,
            institution: "Settlers High".to_string(),
            field_of_study: "General".to_string(),
            year_completed: 2014,
        },
        degree_record("edu-2"),
    ];
    let responses = BTreeMap::new();
    let history = CandidateHistory {
        education: &education,
        experience: &[],
        responses: &responses,
    };

    assert_eq!(history.highest_nqf(), 7);
}

fn rating_strategy() -> impl Strategy<Value = ResponseRating> {
    prop_oneof![
        Just(ResponseRating::Yes),
        Just(ResponseRating::Partially),
        Just(ResponseRating::No),
    ]
}

fn history_parts_strategy() -> impl Strategy<
    Value = (
        Vec<EducationRecord>,
        Vec<WorkExperienceRecord>,
        Vec<Option<ResponseRating>>,
    ),
> {
    (
        prop::bool::ANY,
        prop::bool::ANY,
        prop::collection::vec(prop::option::of(rating_strategy()), 15),
    )
        .prop_map(|(has_degree, has_position, ratings)| {
            let education = if has_degree {
                vec![degree_record("edu-fuzz")]
            } else {
                Vec::new()
            };
            let experience = if has_position {
                vec![three_year_position("exp-fuzz")]
            } else {
                Vec::new()
            };
            (education, experience, ratings)
        })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]
    #[test]
    fn composite_total_stays_within_bounds_for_random_histories(
        task_count in 0usize..=15,
        years_required in 0u32..=12,
        preferred_nqf in 0u8..=10,
        (education, experience, ratings) in history_parts_strategy(),
    ) {
        let occupation = occupation(
            "occ-fuzz",
            "133199",
            "Fuzzed Occupation",
            years_required,
            preferred_nqf,
            task_count,
        );

        let mut responses: BTreeMap<TaskId, ResponseRating> = BTreeMap::new();
        for (task, rating) in occupation.tasks.iter().zip(ratings) {
            if let Some(rating) = rating {
                responses.insert(task.id.clone(), rating);
            }
        }

        let history = CandidateHistory {
            education: &education,
            experience: &experience,
            responses: &responses,
        };
        let outcome = engine().score(&history, &occupation, today());

        prop_assert!(outcome.total <= 100, "total {} out of bounds", outcome.total);
        for component in &outcome.components {
            prop_assert!(
                (0.0..=100.0).contains(&component.value),
                "{:?} component {} out of bounds",
                component.factor,
                component.value
            );
        }
    }

    #[test]
    fn fully_answered_histories_never_exceed_the_composite_cap(
        task_count in 1usize..=15,
        years_required in 0u32..=12,
        preferred_nqf in 0u8..=10,
    ) {
        let occupation = occupation(
            "occ-full",
            "133198",
            "Fully Answered Occupation",
            years_required,
            preferred_nqf,
            task_count,
        );

        let education = vec![degree_record("edu-full")];
        let experience = vec![three_year_position("exp-full")];
        let mut responses: BTreeMap<TaskId, ResponseRating> = BTreeMap::new();
        for task in &occupation.tasks {
            responses.insert(task.id.clone(), ResponseRating::Yes);
        }

        let history = CandidateHistory {
            education: &education,
            experience: &experience,
            responses: &responses,
        };
        let outcome = engine().score(&history, &occupation, today());

        prop_assert!(outcome.total <= 100, "total {} out of bounds", outcome.total);
    }
}
