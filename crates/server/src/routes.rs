// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP routing.
//!
//! Each route extracts its path, query, and body, then runs the matching
//! `nyushi_api` handler on the blocking pool under the request deadline.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use nyushi_api::{
    AdmissionInfoPathParams, ApiError, ApiResult, DepartmentPathParams, ErrorResponse,
    MajorPathParams, SchedulePathParams, SearchParams, SearchResponse, SubjectBatchRequest,
    SubjectPathParams,
};
use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, CatalogError, Department, ErrorKind, Major, Subject,
    TestType, University,
};
use nyushi_persistence::{Deadline, HealthReport, Persistence};
use tracing::error;

use crate::config::Timeouts;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The repository. Every method takes `&self`.
    pub persistence: Arc<Persistence>,
    pub timeouts: Timeouts,
}

impl AppState {
    #[must_use]
    pub fn new(persistence: Persistence, timeouts: Timeouts) -> Self {
        Self {
            persistence: Arc::new(persistence),
            timeouts,
        }
    }
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    body: ErrorResponse,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self {
            status: StatusCode::from_u16(err.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: err.body,
        }
    }
}

type HttpResult<T> = Result<T, HttpError>;

fn decode<T>(body: Result<Json<T>, JsonRejection>) -> HttpResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::malformed_body(rejection.body_text()).into())
}

/// Slack given to the outer timer past the request budget, so that a write
/// checking its deadline just before commit reports its own outcome.
pub(crate) const COMMIT_GRACE: Duration = Duration::from_millis(250);

/// Runs `call` on the blocking pool with a fresh deadline of `budget`.
///
/// The repository observes the same deadline and rolls back writes that
/// outlive it; the outer timeout only fires when a call has not returned
/// within `budget` plus [`COMMIT_GRACE`].
pub(crate) async fn run_blocking<T, F>(
    state: &AppState,
    budget: Duration,
    operation: &'static str,
    call: F,
) -> HttpResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Persistence, &Deadline) -> ApiResult<T> + Send + 'static,
{
    let deadline: Deadline = Deadline::after(budget);
    let persistence: Arc<Persistence> = Arc::clone(&state.persistence);
    let task = tokio::task::spawn_blocking(move || call(&persistence, &deadline));
    match tokio::time::timeout(budget + COMMIT_GRACE, task).await {
        Ok(Ok(result)) => result.map_err(HttpError::from),
        Ok(Err(join_error)) => {
            error!(operation, error = %join_error, "Request task failed");
            Err(ApiError::from(
                CatalogError::new(ErrorKind::Database, "request task failed")
                    .with_operation(operation),
            )
            .into())
        }
        Err(_) => Err(ApiError::deadline_exceeded(operation).into()),
    }
}

// ============================================================================
// Universities
// ============================================================================

async fn handle_list_universities(
    AxumState(state): AxumState<AppState>,
) -> HttpResult<Json<Vec<University>>> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "find_all", nyushi_api::list_universities)
        .await
        .map(Json)
}

async fn handle_search_universities(
    AxumState(state): AxumState<AppState>,
    Query(params): Query<SearchParams>,
) -> HttpResult<Json<SearchResponse>> {
    let budget: Duration = state.timeouts.search;
    run_blocking(&state, budget, "search", move |p, d| {
        nyushi_api::search_universities(p, &params, d)
    })
    .await
    .map(Json)
}

async fn handle_get_university(
    AxumState(state): AxumState<AppState>,
    Path(university_id): Path<String>,
) -> HttpResult<Json<University>> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "find_by_id", move |p, d| {
        nyushi_api::get_university(p, &university_id, d)
    })
    .await
    .map(Json)
}

async fn handle_create_university(
    AxumState(state): AxumState<AppState>,
    body: Result<Json<University>, JsonRejection>,
) -> HttpResult<Json<University>> {
    let body: University = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "create", move |p, d| {
        nyushi_api::create_university(p, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_update_university(
    AxumState(state): AxumState<AppState>,
    Path(university_id): Path<String>,
    body: Result<Json<University>, JsonRejection>,
) -> HttpResult<Json<University>> {
    let body: University = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "update", move |p, d| {
        nyushi_api::update_university(p, &university_id, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_delete_university(
    AxumState(state): AxumState<AppState>,
    Path(university_id): Path<String>,
) -> HttpResult<StatusCode> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "delete", move |p, d| {
        nyushi_api::delete_university(p, &university_id, d)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Departments
// ============================================================================

async fn handle_get_department(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<DepartmentPathParams>,
) -> HttpResult<Json<Department>> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "find_department", move |p, d| {
        nyushi_api::get_department(p, &params, d)
    })
    .await
    .map(Json)
}

async fn handle_create_department(
    AxumState(state): AxumState<AppState>,
    Path(university_id): Path<String>,
    body: Result<Json<Department>, JsonRejection>,
) -> HttpResult<Json<Department>> {
    let body: Department = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "create", move |p, d| {
        nyushi_api::create_department(p, &university_id, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_update_department(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<DepartmentPathParams>,
    body: Result<Json<Department>, JsonRejection>,
) -> HttpResult<Json<Department>> {
    let body: Department = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "update", move |p, d| {
        nyushi_api::update_department(p, &params, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_delete_department(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<DepartmentPathParams>,
) -> HttpResult<StatusCode> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "delete", move |p, d| {
        nyushi_api::delete_department(p, &params, d)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Majors
// ============================================================================

async fn handle_get_major(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<MajorPathParams>,
) -> HttpResult<Json<Major>> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "find_major", move |p, d| {
        nyushi_api::get_major(p, &params, d)
    })
    .await
    .map(Json)
}

async fn handle_create_major(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<DepartmentPathParams>,
    body: Result<Json<Major>, JsonRejection>,
) -> HttpResult<Json<Major>> {
    let body: Major = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "create", move |p, d| {
        nyushi_api::create_major(p, &params, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_update_major(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<MajorPathParams>,
    body: Result<Json<Major>, JsonRejection>,
) -> HttpResult<Json<Major>> {
    let body: Major = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "update", move |p, d| {
        nyushi_api::update_major(p, &params, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_delete_major(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<MajorPathParams>,
) -> HttpResult<StatusCode> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "delete", move |p, d| {
        nyushi_api::delete_major(p, &params, d)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admission schedules and infos
// ============================================================================

async fn handle_get_admission_schedule(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<SchedulePathParams>,
) -> HttpResult<Json<AdmissionSchedule>> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "find_admission_schedule", move |p, d| {
        nyushi_api::get_admission_schedule(p, &params, d)
    })
    .await
    .map(Json)
}

async fn handle_update_admission_schedule(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<SchedulePathParams>,
    body: Result<Json<AdmissionSchedule>, JsonRejection>,
) -> HttpResult<Json<AdmissionSchedule>> {
    let body: AdmissionSchedule = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "update", move |p, d| {
        nyushi_api::update_admission_schedule(p, &params, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_create_admission_info(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<SchedulePathParams>,
    body: Result<Json<AdmissionInfo>, JsonRejection>,
) -> HttpResult<Json<AdmissionInfo>> {
    let body: AdmissionInfo = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "create", move |p, d| {
        nyushi_api::create_admission_info(p, &params, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_get_admission_info(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<AdmissionInfoPathParams>,
) -> HttpResult<Json<AdmissionInfo>> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "find_admission_info", move |p, d| {
        nyushi_api::get_admission_info(p, &params, d)
    })
    .await
    .map(Json)
}

async fn handle_update_admission_info(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<AdmissionInfoPathParams>,
    body: Result<Json<AdmissionInfo>, JsonRejection>,
) -> HttpResult<Json<AdmissionInfo>> {
    let body: AdmissionInfo = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "update", move |p, d| {
        nyushi_api::update_admission_info(p, &params, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_delete_admission_info(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<AdmissionInfoPathParams>,
) -> HttpResult<StatusCode> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "delete", move |p, d| {
        nyushi_api::delete_admission_info(p, &params, d)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Subjects
// ============================================================================

async fn handle_get_subject(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<SubjectPathParams>,
) -> HttpResult<Json<Subject>> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "find_subject", move |p, d| {
        nyushi_api::get_subject(p, &params, d)
    })
    .await
    .map(Json)
}

async fn handle_create_subject(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<DepartmentPathParams>,
    body: Result<Json<Subject>, JsonRejection>,
) -> HttpResult<Json<Subject>> {
    let body: Subject = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "create", move |p, d| {
        nyushi_api::create_subject(p, &params, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_update_subject(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<SubjectPathParams>,
    body: Result<Json<Subject>, JsonRejection>,
) -> HttpResult<Json<Subject>> {
    let body: Subject = decode(body)?;
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "update", move |p, d| {
        nyushi_api::update_subject(p, &params, &body, d)
    })
    .await
    .map(Json)
}

async fn handle_delete_subject(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<SubjectPathParams>,
) -> HttpResult<StatusCode> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "delete", move |p, d| {
        nyushi_api::delete_subject(p, &params, d)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_batch_update_subjects(
    AxumState(state): AxumState<AppState>,
    Path(params): Path<DepartmentPathParams>,
    body: Result<Json<SubjectBatchRequest>, JsonRejection>,
) -> HttpResult<Json<TestType>> {
    let body: SubjectBatchRequest = decode(body)?;
    let budget: Duration = state.timeouts.batch;
    run_blocking(&state, budget, "batch_update", move |p, d| {
        nyushi_api::batch_update_subjects(p, &params, &body, d)
    })
    .await
    .map(Json)
}

// ============================================================================
// Health
// ============================================================================

async fn handle_health(AxumState(state): AxumState<AppState>) -> HttpResult<Json<HealthReport>> {
    let budget: Duration = state.timeouts.request;
    run_blocking(&state, budget, "ping", nyushi_api::health)
        .await
        .map(Json)
}

/// Builds the application router.
pub fn build_router(app_state: AppState) -> Router {
    const UNIVERSITY: &str = "/api/universities/{university_id}";
    const DEPARTMENT: &str = "/api/universities/{university_id}/departments/{department_id}";
    const MAJOR: &str =
        "/api/universities/{university_id}/departments/{department_id}/majors/{major_id}";
    const SCHEDULE: &str = "/api/universities/{university_id}/departments/{department_id}/majors/{major_id}/schedules/{schedule_id}";

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/universities",
            get(handle_list_universities).post(handle_create_university),
        )
        .route("/api/universities/search", get(handle_search_universities))
        .route(
            UNIVERSITY,
            get(handle_get_university)
                .put(handle_update_university)
                .delete(handle_delete_university),
        )
        .route(
            &format!("{UNIVERSITY}/departments"),
            post(handle_create_department),
        )
        .route(
            DEPARTMENT,
            get(handle_get_department)
                .put(handle_update_department)
                .delete(handle_delete_department),
        )
        .route(
            &format!("{DEPARTMENT}/majors"),
            post(handle_create_major),
        )
        .route(
            MAJOR,
            get(handle_get_major)
                .put(handle_update_major)
                .delete(handle_delete_major),
        )
        .route(
            SCHEDULE,
            get(handle_get_admission_schedule).put(handle_update_admission_schedule),
        )
        .route(
            &format!("{SCHEDULE}/admission-infos"),
            post(handle_create_admission_info),
        )
        .route(
            &format!("{SCHEDULE}/admission-infos/{{info_id}}"),
            get(handle_get_admission_info)
                .put(handle_update_admission_info)
                .delete(handle_delete_admission_info),
        )
        .route(
            &format!("{DEPARTMENT}/subjects"),
            post(handle_create_subject),
        )
        .route(
            &format!("{DEPARTMENT}/subjects/batch"),
            put(handle_batch_update_subjects),
        )
        .route(
            &format!("{DEPARTMENT}/subjects/{{subject_id}}"),
            get(handle_get_subject)
                .put(handle_update_subject)
                .delete(handle_delete_subject),
        )
        .with_state(app_state)
}
