use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use guidance::candidates::{
    candidate_router, CandidateService, CandidateStore, NotificationPublisher,
};
use guidance::content::{ContentCatalog, Occupation};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Public listing entry for the occupation browse endpoint. Task content is
/// deliberately omitted; assessments are generated per candidate.
#[derive(Debug, Serialize)]
pub(crate) struct OccupationSummary {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) industry: Option<String>,
    pub(crate) years_of_experience: u32,
    pub(crate) preferred_nqf_level: u8,
    pub(crate) task_count: usize,
}

impl From<Occupation> for OccupationSummary {
    fn from(occupation: Occupation) -> Self {
        Self {
            id: occupation.id.0,
            code: occupation.code.0,
            title: occupation.title,
            description: occupation.description,
            industry: occupation.industry.map(|industry| industry.name),
            years_of_experience: occupation.years_of_experience,
            preferred_nqf_level: occupation.preferred_nqf_level,
            task_count: occupation.tasks.len(),
        }
    }
}

pub(crate) fn with_candidate_routes<S, C, N>(
    service: Arc<CandidateService<S, C, N>>,
) -> axum::Router
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    candidate_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/occupations",
            axum::routing::get(occupations_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn occupations_endpoint(
    Extension(catalog): Extension<Arc<dyn ContentCatalog>>,
) -> impl IntoResponse {
    match catalog.occupations() {
        Ok(occupations) => {
            let summaries: Vec<OccupationSummary> = occupations
                .into_iter()
                .map(OccupationSummary::from)
                .collect();
            (StatusCode::OK, Json(json!({ "occupations": summaries }))).into_response()
        }
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}
