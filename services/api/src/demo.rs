use crate::infra::{
    default_scoring_config, seeded_catalog, InMemoryCandidateStore, InMemoryNotificationPublisher,
};
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use guidance::candidates::{
    CandidateHistory, CandidateId, CandidateService, EducationLevel, EducationRecord,
    EducationSubmission, ExperienceSubmission, IdentityDetails, ProficiencyEngine,
    ResponseRating, ResponseSubmission, TargetPriority, TargetSubmission, WorkExperienceRecord,
};
use guidance::content::{ContentCatalog, OccupationId, TaskId};
use guidance::error::AppError;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Candidate identifier used throughout the demo
    #[arg(long, default_value = "cand-demo")]
    pub(crate) candidate: String,
    /// Override the reporting date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Seeded occupation to score against
    #[arg(long, default_value = "occ-133102")]
    pub(crate) occupation: String,
    /// Highest education level (matric, certificate, diploma, degree,
    /// honours, masters, doctorate)
    #[arg(long, value_parser = parse_education_level)]
    pub(crate) education: Option<EducationLevel>,
    /// Years of work experience
    #[arg(long, default_value_t = 0)]
    pub(crate) years_experience: u32,
    /// Number of assessment tasks answered "yes"
    #[arg(long, default_value_t = 0)]
    pub(crate) answered_yes: usize,
    /// Number of assessment tasks answered "partially"
    #[arg(long, default_value_t = 0)]
    pub(crate) answered_partially: usize,
}

fn parse_education_level(raw: &str) -> Result<EducationLevel, String> {
    match raw.trim().to_lowercase().as_str() {
        "matric" => Ok(EducationLevel::Matric),
        "certificate" => Ok(EducationLevel::Certificate),
        "diploma" => Ok(EducationLevel::Diploma),
        "degree" => Ok(EducationLevel::Degree),
        "honours" | "honors" => Ok(EducationLevel::Honors),
        "masters" => Ok(EducationLevel::Masters),
        "doctorate" => Ok(EducationLevel::Doctorate),
        other => Err(format!("unknown education level '{other}'")),
    }
}

/// One-off proficiency report for a synthetic candidate, printed to stdout.
pub(crate) fn run_score_report(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        occupation,
        education,
        years_experience,
        answered_yes,
        answered_partially,
    } = args;

    let catalog = seeded_catalog();
    let today = Local::now().date_naive();

    let occupation = match catalog.occupation(&OccupationId(occupation.clone()))? {
        Some(occupation) => occupation,
        None => {
            println!("Unknown occupation '{occupation}'. Seeded occupations:");
            for entry in catalog.occupations()? {
                println!("  - {} ({})", entry.id.0, entry.title);
            }
            return Ok(());
        }
    };

    let education_records: Vec<EducationRecord> = education
        .map(|level| {
            vec![EducationRecord {
                id: "edu-demo".to_string(),
                level,
                institution: "Demo Institution".to_string(),
                field_of_study: "Demo Field".to_string(),
                year_completed: 2019,
            }]
        })
        .unwrap_or_default();

    let experience_records: Vec<WorkExperienceRecord> = if years_experience > 0 {
        let start = today - chrono::Duration::days(i64::from(years_experience) * 365);
        vec![WorkExperienceRecord {
            id: "exp-demo".to_string(),
            job_title: "Demo Position".to_string(),
            company: "Demo Employer".to_string(),
            start_date: start,
            end_date: Some(today),
        }]
    } else {
        Vec::new()
    };

    let mut responses: BTreeMap<TaskId, ResponseRating> = BTreeMap::new();
    for task in occupation.tasks.iter().take(answered_yes) {
        responses.insert(task.id.clone(), ResponseRating::Yes);
    }
    for task in occupation
        .tasks
        .iter()
        .skip(answered_yes)
        .take(answered_partially)
    {
        responses.insert(task.id.clone(), ResponseRating::Partially);
    }

    let history = CandidateHistory {
        education: &education_records,
        experience: &experience_records,
        responses: &responses,
    };
    let engine = ProficiencyEngine::new(default_scoring_config());
    let outcome = engine.score(&history, &occupation, today);

    println!(
        "Proficiency report for {} ({})",
        occupation.title, occupation.code.0
    );
    println!(
        "- Requirements: {} years experience, preferred NQF {}",
        occupation.years_of_experience, occupation.preferred_nqf_level
    );
    println!("- Composite score: {}/100", outcome.total);
    println!("- Components:");
    for component in &outcome.components {
        println!(
            "    {:?}: {:.1} ({})",
            component.factor, component.value, component.notes
        );
    }

    Ok(())
}

/// End-to-end onboarding journey against the in-memory infrastructure.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { candidate, today } = args;
    let now = today
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now);

    println!("Candidate onboarding demo");

    let store = Arc::new(InMemoryCandidateStore::default());
    let catalog = Arc::new(seeded_catalog());
    let notifier = Arc::new(InMemoryNotificationPublisher::default());
    let service = CandidateService::new(
        store,
        catalog.clone(),
        notifier.clone(),
        default_scoring_config(),
    );

    let id = CandidateId(candidate);

    let status = service.onboarding_status(&id)?;
    println!(
        "- First touch: score {}/10, active step '{}'",
        status.score, status.active_step
    );

    let status = service.record_identity(
        &id,
        IdentityDetails {
            first_name: "Naledi".to_string(),
            last_name: "Mokoena".to_string(),
        },
    )?;
    println!("- Identity captured: score {}/10", status.score);

    service.add_education(
        &id,
        EducationSubmission {
            level: EducationLevel::Degree,
            institution: "University of Cape Town".to_string(),
            field_of_study: "Computer Science".to_string(),
            year_completed: 2019,
        },
    )?;
    println!("- Education recorded: Bachelor's Degree (NQF 7)");

    service.add_experience(
        &id,
        ExperienceSubmission {
            job_title: "Project Coordinator".to_string(),
            company: "Mindworx".to_string(),
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid date"),
            end_date: Some(NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")),
        },
    )?;
    println!("- Experience recorded: 3.0 years as Project Coordinator");

    let status = service.add_target(
        &id,
        TargetSubmission {
            occupation_id: OccupationId("occ-133102".to_string()),
            priority: TargetPriority::High,
        },
    )?;
    println!(
        "- Target selected: ICT Project Manager (high priority), score {}/10",
        status.score
    );

    let assessment = service.onboarding_assessment(&id)?;
    println!("- Quick assessment ({} questions):", assessment.questions.len());
    for question in &assessment.questions {
        println!("    * {}", question.title);
    }

    let responses: Vec<ResponseSubmission> = assessment
        .questions
        .iter()
        .map(|question| ResponseSubmission {
            task_id: question.task_id.clone(),
            response: ResponseRating::Yes,
        })
        .collect();
    let status = service.submit_onboarding_assessment(&id, responses)?;
    println!(
        "- Assessment submitted: score {}/10, onboarded: {}",
        status.score, status.is_onboarded
    );

    let dashboard = service.dashboard(&id, now)?;
    println!("\nDashboard");
    println!("- Highest qualification: {}", dashboard.highest_nqf_level);
    println!(
        "- Occupation matches: {}",
        dashboard.occupation_matches_count
    );
    println!("- Proficiency scores:");
    for entry in &dashboard.recommended_occupations {
        let marker = if entry.is_target { "target" } else { "suggested" };
        println!(
            "    {} ({}): {}/100 [{}]",
            entry.title, entry.code.0, entry.score, marker
        );
    }
    for (code, progress) in &dashboard.assessment_progress {
        println!(
            "- Assessment progress {}: {}/{} ({}%)",
            code.0, progress.answered, progress.total, progress.percentage
        );
    }

    let events = notifier.events();
    if events.is_empty() {
        println!("- Notifications: none dispatched");
    } else {
        println!("- Notifications:");
        for event in events {
            println!("    template={} -> {}", event.template, event.candidate_id.0);
        }
    }

    Ok(())
}
