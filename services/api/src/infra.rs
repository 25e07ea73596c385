use chrono::NaiveDate;
use guidance::candidates::{
    CandidateId, CandidateNotification, CandidateRecord, CandidateStore, NotificationPublisher,
    NotifyError, ScoringConfig, StoreError,
};
use guidance::content::{
    CatalogError, ContentCatalog, Industry, Occupation, OccupationId, OccupationTask, OfoCode,
    TaskId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCandidateStore {
    records: Arc<Mutex<HashMap<CandidateId, CandidateRecord>>>,
}

impl CandidateStore for InMemoryCandidateStore {
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
        if guard.contains_key(&record.candidate_id) {
            guard.insert(record.candidate_id.clone(), record);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
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
pub(crate) struct InMemoryContentCatalog {
    occupations: Vec<Occupation>,
}

impl InMemoryContentCatalog {
    pub(crate) fn new(mut occupations: Vec<Occupation>) -> Self {
        occupations.sort_by(|a, b| a.code.cmp(&b.code));
        Self { occupations }
    }
}

impl ContentCatalog for InMemoryContentCatalog {
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
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<CandidateNotification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: CandidateNotification) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().expect("notifier mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<CandidateNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

pub(crate) fn default_scoring_config() -> ScoringConfig {
    ScoringConfig::default()
}

fn ict_industry() -> Industry {
    Industry {
        code: "ICT".to_string(),
        name: "Information and Communication Technology".to_string(),
        description: "Software, infrastructure, and telecommunications occupations".to_string(),
    }
}

fn occupation(
    id: &str,
    code: &str,
    title: &str,
    description: &str,
    years_of_experience: u32,
    preferred_nqf_level: u8,
    tasks: &[&str],
) -> Occupation {
    Occupation {
        id: OccupationId(id.to_string()),
        code: OfoCode(code.to_string()),
        title: title.to_string(),
        description: description.to_string(),
        industry: Some(ict_industry()),
        years_of_experience,
        preferred_nqf_level,
        tasks: tasks
            .iter()
            .enumerate()
            .map(|(index, task_title)| OccupationTask {
                id: TaskId(format!("task-{id}-{:02}", index + 1)),
                title: (*task_title).to_string(),
                description: format!("{task_title}, as routinely performed by a {title}."),
                skills: vec![
                    "stakeholder management".to_string(),
                    "planning".to_string(),
                ],
            })
            .collect(),
    }
}

/// The OFO occupations the service ships with until a database-backed
/// catalog replaces this seed.
pub(crate) fn seeded_catalog() -> InMemoryContentCatalog {
    InMemoryContentCatalog::new(vec![
        occupation(
            "occ-133102",
            "133102",
            "ICT Project Manager",
            "Plans, directs, and coordinates ICT projects from initiation to closure.",
            5,
            7,
            &[
                "Define project scope, goals, and deliverables with stakeholders",
                "Develop and maintain detailed project schedules",
                "Manage the project budget and track expenditure",
                "Coordinate cross-functional delivery teams",
                "Identify, assess, and mitigate project risks",
                "Facilitate sprint planning and review ceremonies",
                "Report progress and escalations to steering committees",
                "Manage vendor and supplier relationships",
                "Verify deliverables against agreed quality standards",
            ],
        ),
        occupation(
            "occ-133103",
            "133103",
            "ICT Infrastructure Project Manager",
            "Delivers data centre, network, and cloud infrastructure projects.",
            7,
            7,
            &[
                "Plan infrastructure rollouts across data centre and cloud estates",
                "Coordinate network, server, and storage workstreams",
                "Manage infrastructure procurement and licensing",
                "Schedule maintenance windows and change freezes",
                "Oversee capacity planning with architecture teams",
                "Run disaster-recovery and failover testing programmes",
                "Track availability targets against service level agreements",
                "Coordinate migrations with minimal service disruption",
                "Manage outsourced infrastructure partners",
                "Maintain the infrastructure risk register",
                "Report infrastructure project health to leadership",
            ],
        ),
        occupation(
            "occ-133104",
            "133104",
            "Senior ICT Project Manager",
            "Leads large, multi-stream ICT programmes and mentors delivery staff.",
            8,
            8,
            &[
                "Direct multi-stream programmes across business units",
                "Set delivery standards and governance frameworks",
                "Negotiate programme budgets with executive sponsors",
                "Arbitrate competing priorities across project streams",
                "Mentor and develop project managers",
                "Own executive steering committee relationships",
                "Shape vendor strategy and master service agreements",
                "Oversee benefits realisation tracking",
                "Lead recovery of troubled projects",
                "Approve stage gates and release decisions",
                "Align programme roadmaps with enterprise architecture",
                "Champion delivery process improvement initiatives",
                "Manage programme-level risk and compliance reporting",
            ],
        ),
    ])
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
