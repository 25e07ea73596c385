use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::candidates::domain::{
    CandidateId, EducationLevel, EducationRecord, ResponseRating, WorkExperienceRecord,
};
use crate::candidates::repository::{
    CandidateNotification, CandidateRecord, CandidateStore, NotificationPublisher, NotifyError,
    StoreError,
};
use crate::candidates::router::candidate_router;
use crate::candidates::service::CandidateService;
use crate::candidates::ScoringConfig;
use crate::content::{
    CatalogError, ContentCatalog, Industry, Occupation, OccupationId, OccupationTask, OfoCode,
    TaskId,
};

pub(super) fn ict_industry() -> Industry {
    Industry {
        code: "ICT".to_string(),
        name: "Information and Communication Technology".to_string(),
        description: "Technology, software, and telecommunications".to_string(),
    }
}

pub(super) fn occupation(
    id: &str,
    code: &str,
    title: &str,
    years_of_experience: u32,
    preferred_nqf_level: u8,
    task_count: usize,
) -> Occupation {
    let tasks = (1..=task_count)
        .map(|n| OccupationTask {
            id: TaskId(format!("task-{id}-{n}")),
            title: format!("{title} task {n}"),
            description: format!("Representative duty {n} for a {title}"),
            skills: vec!["planning".to_string(), "communication".to_string()],
        })
        .collect();

    Occupation {
        id: OccupationId(id.to_string()),
        code: OfoCode(code.to_string()),
        title: title.to_string(),
        description: format!("{title} within the ICT sector"),
        industry: Some(ict_industry()),
        years_of_experience,
        preferred_nqf_level,
        tasks,
    }
}

pub(super) fn project_manager() -> Occupation {
    occupation("occ-133102", "133102", "ICT Project Manager", 5, 7, 6)
}

pub(super) fn infrastructure_manager() -> Occupation {
    occupation(
        "occ-133103",
        "133103",
        "ICT Infrastructure Project Manager",
        7,
        7,
        11,
    )
}

pub(super) fn senior_manager() -> Occupation {
    occupation("occ-133104", "133104", "Senior ICT Project Manager", 8, 8, 13)
}

pub(super) fn catalog_occupations() -> Vec<Occupation> {
    vec![project_manager(), infrastructure_manager(), senior_manager()]
}

pub(super) fn candidate_id(suffix: &str) -> CandidateId {
    CandidateId(format!("cand-{suffix}"))
}

pub(super) fn degree_record(id: &str) -> EducationRecord {
    EducationRecord {
        id: id.to_string(),
        level: EducationLevel::Degree,
        institution: "University of Cape Town".to_string(),
        field_of_study: "Computer Science".to_string(),
        year_completed: 2019,
    }
}

/// A closed three-year position (1096 days, 3.0 years after rounding).
pub(super) fn three_year_position(id: &str) -> WorkExperienceRecord {
    WorkExperienceRecord {
        id: id.to_string(),
        job_title: "Project Coordinator".to_string(),
        company: "Mindworx".to_string(),
        start_date: NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid date"),
        end_date: Some(NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")),
    }
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

pub(super) fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid timestamp")
}

/// Answer the first `yes` tasks with Yes and the next `partially` with
/// Partially, in task order.
pub(super) fn answer_tasks(
    record: &mut CandidateRecord,
    occupation: &Occupation,
    yes: usize,
    partially: usize,
) {
    for task in occupation.tasks.iter().take(yes) {
        record.responses.insert(task.id.clone(), ResponseRating::Yes);
    }
    for task in occupation.tasks.iter().skip(yes).take(partially) {
        record
            .responses
            .insert(task.id.clone(), ResponseRating::Partially);
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<HashMap<CandidateId, CandidateRecord>>>,
}

impl MemoryStore {
    pub(super) fn get(&self, id: &CandidateId) -> Option<CandidateRecord> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn put(&self, record: CandidateRecord) {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(record.candidate_id.clone(), record);
    }
}

impl CandidateStore for MemoryStore {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&record.candidate_id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.candidate_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: CandidateRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(record.candidate_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn dirty(&self, limit: usize) -> Result<Vec<CandidateRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut pending: Vec<CandidateRecord> = guard
            .values()
            .filter(|record| record.profile.stats_update_needed)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));
        pending.truncate(limit);
        Ok(pending)
    }
}

#[derive(Clone)]
pub(super) struct MemoryCatalog {
    occupations: Vec<Occupation>,
}

impl MemoryCatalog {
    pub(super) fn new(mut occupations: Vec<Occupation>) -> Self {
        occupations.sort_by(|a, b| a.code.cmp(&b.code));
        Self { occupations }
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new(catalog_occupations())
    }
}

impl ContentCatalog for MemoryCatalog {
    fn occupation(&self, id: &OccupationId) -> Result<Option<Occupation>, CatalogError> {
        Ok(self
            .occupations
            .iter()
            .find(|occupation| &occupation.id == id)
            .cloned())
    }

    fn task(&self, id: &TaskId) -> Result<Option<OccupationTask>, CatalogError> {
        Ok(self
            .occupations
            .iter()
            .flat_map(|occupation| occupation.tasks.iter())
            .find(|task| &task.id == id)
            .cloned())
    }

    fn occupations(&self) -> Result<Vec<Occupation>, CatalogError> {
        Ok(self.occupations.clone())
    }

    fn related_by_industry(
        &self,
        industry_codes: &BTreeSet<String>,
        exclude: &BTreeSet<OccupationId>,
        limit: usize,
    ) -> Result<Vec<Occupation>, CatalogError> {
        Ok(self
            .occupations
            .iter()
            .filter(|occupation| {
                occupation
                    .industry
                    .as_ref()
                    .map(|industry| industry_codes.contains(&industry.code))
                    .unwrap_or(false)
                    && !exclude.contains(&occupation.id)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<CandidateNotification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<CandidateNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifier {
    fn publish(&self, notification: CandidateNotification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl CandidateStore for UnavailableStore {
    fn insert(&self, _record: CandidateRecord) -> Result<CandidateRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: CandidateRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &CandidateId) -> Result<Option<CandidateRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn dirty(&self, _limit: usize) -> Result<Vec<CandidateRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) type TestService = CandidateService<MemoryStore, MemoryCatalog, MemoryNotifier>;

pub(super) fn build_service() -> (Arc<TestService>, Arc<MemoryStore>, Arc<MemoryNotifier>) {
    build_service_with(MemoryCatalog::default())
}

pub(super) fn build_service_with(
    catalog: MemoryCatalog,
) -> (Arc<TestService>, Arc<MemoryStore>, Arc<MemoryNotifier>) {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = Arc::new(CandidateService::new(
        store.clone(),
        Arc::new(catalog),
        notifier.clone(),
        ScoringConfig::default(),
    ));
    (service, store, notifier)
}

pub(super) fn candidate_router_with_service(service: Arc<TestService>) -> axum::Router {
    candidate_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
