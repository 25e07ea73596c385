use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use super::domain::CandidateId;
use super::repository::{CandidateStore, NotificationPublisher, StoreError};
use super::service::{
    CandidateService, CandidateServiceError, EducationSubmission, ExperienceSubmission,
    IdentitySubmission, ResponseSubmission, TargetSubmission,
};
use crate::content::{ContentCatalog, OccupationId};

/// Router builder exposing the candidate onboarding, assessment, and
/// dashboard endpoints.
pub fn candidate_router<S, C, N>(service: Arc<CandidateService<S, C, N>>) -> Router
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/candidates/:candidate_id/onboarding",
            get(onboarding_status_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/profile",
            post(profile_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/education",
            post(add_education_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/education/:record_id",
            axum::routing::delete(remove_education_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/experience",
            post(add_experience_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/experience/:record_id",
            axum::routing::delete(remove_experience_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/targets",
            post(add_target_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/targets/:occupation_id",
            axum::routing::delete(remove_target_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/assessment",
            get(quick_assessment_handler::<S, C, N>)
                .post(submit_quick_assessment_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/assessments/:occupation_id",
            get(occupation_assessment_handler::<S, C, N>)
                .post(submit_occupation_assessment_handler::<S, C, N>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/dashboard",
            get(dashboard_handler::<S, C, N>),
        )
        .with_state(service)
}

fn error_response(error: CandidateServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    let status = match error {
        CandidateServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CandidateServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        CandidateServiceError::Store(StoreError::NotFound)
        | CandidateServiceError::OccupationNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn onboarding_status_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.onboarding_status(&CandidateId(candidate_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn profile_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path(candidate_id): Path<String>,
    axum::Json(submission): axum::Json<IdentitySubmission>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.record_identity(&CandidateId(candidate_id), submission) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_education_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path(candidate_id): Path<String>,
    axum::Json(submission): axum::Json<EducationSubmission>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.add_education(&CandidateId(candidate_id), submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_education_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path((candidate_id, record_id)): Path<(String, String)>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.remove_education(&CandidateId(candidate_id), &record_id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_experience_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path(candidate_id): Path<String>,
    axum::Json(submission): axum::Json<ExperienceSubmission>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.add_experience(&CandidateId(candidate_id), submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_experience_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path((candidate_id, record_id)): Path<(String, String)>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.remove_experience(&CandidateId(candidate_id), &record_id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_target_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path(candidate_id): Path<String>,
    axum::Json(submission): axum::Json<TargetSubmission>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.add_target(&CandidateId(candidate_id), submission) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_target_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path((candidate_id, occupation_id)): Path<(String, String)>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.remove_target(&CandidateId(candidate_id), &OccupationId(occupation_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn quick_assessment_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.onboarding_assessment(&CandidateId(candidate_id)) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_quick_assessment_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path(candidate_id): Path<String>,
    axum::Json(responses): axum::Json<Vec<ResponseSubmission>>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.submit_onboarding_assessment(&CandidateId(candidate_id), responses) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn occupation_assessment_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path((candidate_id, occupation_id)): Path<(String, String)>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.occupation_assessment(
        &CandidateId(candidate_id),
        &OccupationId(occupation_id),
    ) {
        Ok(sheet) => (StatusCode::OK, axum::Json(sheet)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_occupation_assessment_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path((candidate_id, occupation_id)): Path<(String, String)>,
    axum::Json(responses): axum::Json<Vec<ResponseSubmission>>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.submit_occupation_assessment(
        &CandidateId(candidate_id),
        &OccupationId(occupation_id),
        responses,
    ) {
        Ok(sheet) => (StatusCode::OK, axum::Json(sheet)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dashboard_handler<S, C, N>(
    State(service): State<Arc<CandidateService<S, C, N>>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    match service.dashboard(&CandidateId(candidate_id), Utc::now()) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}
