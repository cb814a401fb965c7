// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Handler functions.
//!
//! Each handler parses its path segments, checks that body identifiers agree
//! with the path, calls exactly one repository write (or the reads needed to
//! verify ancestry), and translates failures into [`ApiError`]. Handlers block
//! and are transport-agnostic: the server decides how they are scheduled and
//! how their results are encoded.

use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, Department, Entity, Major, Subject, TestType, University,
    SearchQuery, parse_id,
};
use nyushi_persistence::{Deadline, HealthReport, Persistence, SchedulePath};
use time::OffsetDateTime;
use tracing::info;

use crate::error::ApiError;
use crate::request_response::{
    AdmissionInfoPathParams, DepartmentPath, DepartmentPathParams, MajorPath, MajorPathParams,
    SchedulePathParams, SearchMeta, SearchParams, SearchResponse, SubjectBatchRequest,
    SubjectPathParams,
};

/// Result of a handler call.
pub type ApiResult<T> = Result<T, ApiError>;

/// Rejects a body whose identifier disagrees with the one in the path.
///
/// A body without an identifier is accepted.
fn ensure_body_id<E: Entity>(field: &str, path_id: i64, body: &E) -> ApiResult<()> {
    match body.id() {
        Some(body_id) if body_id != path_id => {
            Err(ApiError::mismatched_id(field, path_id, body_id))
        }
        _ => Ok(()),
    }
}

/// Verifies that the major of `path` is live under its department and
/// university.
fn verify_major_path(
    persistence: &Persistence,
    path: MajorPath,
    deadline: &Deadline,
) -> ApiResult<Major> {
    persistence.find_department(path.university_id, path.department_id, deadline)?;
    Ok(persistence.find_major(path.department_id, path.major_id, deadline)?)
}

fn verify_schedule_path(
    persistence: &Persistence,
    path: SchedulePath,
    deadline: &Deadline,
) -> ApiResult<AdmissionSchedule> {
    verify_major_path(
        persistence,
        MajorPath {
            university_id: path.university_id,
            department_id: path.department_id,
            major_id: path.major_id,
        },
        deadline,
    )?;
    Ok(persistence.find_admission_schedule(path.major_id, path.schedule_id, deadline)?)
}

// ============================================================================
// Universities
// ============================================================================

/// Lists every live university with its full tree.
///
/// # Errors
///
/// Returns a database or timeout error.
pub fn list_universities(
    persistence: &Persistence,
    deadline: &Deadline,
) -> ApiResult<Vec<University>> {
    Ok(persistence.find_all(deadline)?)
}

/// Searches universities by university, department, or major name.
///
/// The query is trimmed and NFC-normalised; `meta.query` echoes the form
/// that was matched.
///
/// # Errors
///
/// Returns `INVALID_INPUT` with one of the fixed policy messages when the
/// query is missing, blank, longer than 100 characters, or contains `%` or
/// `;`.
pub fn search_universities(
    persistence: &Persistence,
    params: &SearchParams,
    deadline: &Deadline,
) -> ApiResult<SearchResponse> {
    let raw: &str = params.q.as_deref().unwrap_or_default();
    let query: SearchQuery = SearchQuery::parse(raw)?;
    let data: Vec<University> = persistence.search_query(&query, deadline)?;
    Ok(SearchResponse {
        meta: SearchMeta {
            query: query.into_string(),
            count: data.len(),
            timestamp: OffsetDateTime::now_utc(),
        },
        data,
    })
}

/// Reads one university with its full tree.
///
/// # Errors
///
/// Returns `INVALID_INPUT` for a malformed identifier or `NOT_FOUND`.
pub fn get_university(
    persistence: &Persistence,
    raw_id: &str,
    deadline: &Deadline,
) -> ApiResult<University> {
    let id: i64 = parse_id("id", raw_id)?;
    Ok(persistence.find_by_id(id, deadline)?)
}

/// Creates a university together with any subtree it carries.
///
/// # Errors
///
/// Returns a validation error or `DUPLICATE_KEY` when the tree breaks a
/// catalog rule.
pub fn create_university(
    persistence: &Persistence,
    body: &University,
    deadline: &Deadline,
) -> ApiResult<University> {
    info!(name = %body.name, "Handling create_university request");
    Ok(persistence.create_university(body, deadline)?)
}

/// Renames a university.
///
/// The body must carry the version it was read at.
///
/// # Errors
///
/// Returns `INVALID_INPUT` when the body identifier disagrees with the path,
/// `NOT_FOUND`, or a `stale_version` validation error.
pub fn update_university(
    persistence: &Persistence,
    raw_id: &str,
    body: &University,
    deadline: &Deadline,
) -> ApiResult<University> {
    let id: i64 = parse_id("id", raw_id)?;
    ensure_body_id("id", id, body)?;
    info!(id, version = body.record.version, "Handling update_university request");
    Ok(persistence.update_university(id, body, deadline)?)
}

/// Soft-deletes a university and everything below it.
///
/// # Errors
///
/// Returns `INVALID_INPUT` for a malformed identifier or `NOT_FOUND`.
pub fn delete_university(
    persistence: &Persistence,
    raw_id: &str,
    deadline: &Deadline,
) -> ApiResult<()> {
    let id: i64 = parse_id("id", raw_id)?;
    info!(id, "Handling delete_university request");
    Ok(persistence.delete_university(id, deadline)?)
}

// ============================================================================
// Departments
// ============================================================================

/// # Errors
///
/// Returns `NOT_FOUND` unless the department is live under the university.
pub fn get_department(
    persistence: &Persistence,
    params: &DepartmentPathParams,
    deadline: &Deadline,
) -> ApiResult<Department> {
    let path: DepartmentPath = params.parse()?;
    Ok(persistence.find_department(path.university_id, path.department_id, deadline)?)
}

/// # Errors
///
/// Returns `NOT_FOUND` for a missing university or a validation error.
pub fn create_department(
    persistence: &Persistence,
    raw_university_id: &str,
    body: &Department,
    deadline: &Deadline,
) -> ApiResult<Department> {
    let university_id: i64 = parse_id("university_id", raw_university_id)?;
    if let Some(parent) = body.university_id.filter(|parent| *parent != university_id) {
        return Err(ApiError::mismatched_id("university_id", university_id, parent));
    }
    info!(university_id, name = %body.name, "Handling create_department request");
    Ok(persistence.create_department(university_id, body, deadline)?)
}

/// # Errors
///
/// Returns `NOT_FOUND`, `stale_version`, or a field validation error.
pub fn update_department(
    persistence: &Persistence,
    params: &DepartmentPathParams,
    body: &Department,
    deadline: &Deadline,
) -> ApiResult<Department> {
    let path: DepartmentPath = params.parse()?;
    ensure_body_id("department_id", path.department_id, body)?;
    info!(
        university_id = path.university_id,
        department_id = path.department_id,
        "Handling update_department request"
    );
    Ok(persistence.update_department(
        path.university_id,
        path.department_id,
        body,
        deadline,
    )?)
}

/// # Errors
///
/// Returns `NOT_FOUND` unless the department is live under the university.
pub fn delete_department(
    persistence: &Persistence,
    params: &DepartmentPathParams,
    deadline: &Deadline,
) -> ApiResult<()> {
    let path: DepartmentPath = params.parse()?;
    info!(
        university_id = path.university_id,
        department_id = path.department_id,
        "Handling delete_department request"
    );
    Ok(persistence.delete_department(path.university_id, path.department_id, deadline)?)
}

// ============================================================================
// Majors
// ============================================================================

/// # Errors
///
/// Returns `NOT_FOUND` unless every segment of the path is live and
/// correctly nested.
pub fn get_major(
    persistence: &Persistence,
    params: &MajorPathParams,
    deadline: &Deadline,
) -> ApiResult<Major> {
    verify_major_path(persistence, params.parse()?, deadline)
}

/// Creates a major, with any subtree it carries, under a department.
///
/// # Errors
///
/// Returns `NOT_FOUND` for a missing parent or a validation error.
pub fn create_major(
    persistence: &Persistence,
    params: &DepartmentPathParams,
    body: &Major,
    deadline: &Deadline,
) -> ApiResult<Major> {
    let path: DepartmentPath = params.parse()?;
    if let Some(parent) = body.department_id.filter(|parent| *parent != path.department_id) {
        return Err(ApiError::mismatched_id("department_id", path.department_id, parent));
    }
    info!(
        department_id = path.department_id,
        name = %body.name,
        "Handling create_major request"
    );
    Ok(persistence.create_major(path.university_id, path.department_id, body, deadline)?)
}

/// # Errors
///
/// Returns `NOT_FOUND`, `stale_version`, or a field validation error.
pub fn update_major(
    persistence: &Persistence,
    params: &MajorPathParams,
    body: &Major,
    deadline: &Deadline,
) -> ApiResult<Major> {
    let path: MajorPath = params.parse()?;
    ensure_body_id("major_id", path.major_id, body)?;
    info!(major_id = path.major_id, "Handling update_major request");
    Ok(persistence.update_major(
        path.university_id,
        path.department_id,
        path.major_id,
        body,
        deadline,
    )?)
}

/// # Errors
///
/// Returns `NOT_FOUND` unless the major is live under the department.
pub fn delete_major(
    persistence: &Persistence,
    params: &MajorPathParams,
    deadline: &Deadline,
) -> ApiResult<()> {
    let path: MajorPath = params.parse()?;
    info!(major_id = path.major_id, "Handling delete_major request");
    Ok(persistence.delete_major(
        path.university_id,
        path.department_id,
        path.major_id,
        deadline,
    )?)
}

// ============================================================================
// Admission schedules and admission infos
// ============================================================================

/// # Errors
///
/// Returns `NOT_FOUND` unless every segment of the path is live and
/// correctly nested.
pub fn get_admission_schedule(
    persistence: &Persistence,
    params: &SchedulePathParams,
    deadline: &Deadline,
) -> ApiResult<AdmissionSchedule> {
    verify_schedule_path(persistence, params.parse()?, deadline)
}

/// Changes the round name and display order of a schedule.
///
/// # Errors
///
/// Returns `NOT_FOUND`, `stale_version`, `DUPLICATE_KEY`, or a validation
/// error.
pub fn update_admission_schedule(
    persistence: &Persistence,
    params: &SchedulePathParams,
    body: &AdmissionSchedule,
    deadline: &Deadline,
) -> ApiResult<AdmissionSchedule> {
    let path: SchedulePath = params.parse()?;
    ensure_body_id("schedule_id", path.schedule_id, body)?;
    info!(
        schedule_id = path.schedule_id,
        name = body.name.as_str(),
        "Handling update_admission_schedule request"
    );
    Ok(persistence.update_admission_schedule(path, body, deadline)?)
}

/// # Errors
///
/// Returns `NOT_FOUND` unless every segment of the path is live and
/// correctly nested.
pub fn get_admission_info(
    persistence: &Persistence,
    params: &AdmissionInfoPathParams,
    deadline: &Deadline,
) -> ApiResult<AdmissionInfo> {
    let (path, info_id) = params.parse()?;
    verify_schedule_path(persistence, path, deadline)?;
    Ok(persistence.find_admission_info(path.schedule_id, info_id, deadline)?)
}

/// # Errors
///
/// Returns `INVALID_YEAR`, a validity window violation, or `NOT_FOUND`.
pub fn create_admission_info(
    persistence: &Persistence,
    params: &SchedulePathParams,
    body: &AdmissionInfo,
    deadline: &Deadline,
) -> ApiResult<AdmissionInfo> {
    let path: SchedulePath = params.parse()?;
    info!(
        schedule_id = path.schedule_id,
        academic_year = body.academic_year,
        "Handling create_admission_info request"
    );
    Ok(persistence.create_admission_info(path, body, deadline)?)
}

/// # Errors
///
/// Returns `NOT_FOUND`, `stale_version`, `invalid_status_transition`, or a
/// field validation error.
pub fn update_admission_info(
    persistence: &Persistence,
    params: &AdmissionInfoPathParams,
    body: &AdmissionInfo,
    deadline: &Deadline,
) -> ApiResult<AdmissionInfo> {
    let (path, info_id) = params.parse()?;
    ensure_body_id("info_id", info_id, body)?;
    info!(
        info_id,
        status = body.status.as_str(),
        "Handling update_admission_info request"
    );
    Ok(persistence.update_admission_info(path, info_id, body, deadline)?)
}

/// # Errors
///
/// Returns `NOT_FOUND` unless the info is live under the schedule.
pub fn delete_admission_info(
    persistence: &Persistence,
    params: &AdmissionInfoPathParams,
    deadline: &Deadline,
) -> ApiResult<()> {
    let (path, info_id) = params.parse()?;
    info!(info_id, "Handling delete_admission_info request");
    Ok(persistence.delete_admission_info(path, info_id, deadline)?)
}

// ============================================================================
// Subjects
// ============================================================================

/// # Errors
///
/// Returns `NOT_FOUND` unless the subject is live below the department and
/// the department is live under the university.
pub fn get_subject(
    persistence: &Persistence,
    params: &SubjectPathParams,
    deadline: &Deadline,
) -> ApiResult<Subject> {
    let (path, subject_id) = params.parse()?;
    persistence.find_department(path.university_id, path.department_id, deadline)?;
    Ok(persistence.find_subject(path.department_id, subject_id, deadline)?)
}

/// Adds a subject to the test type named by `body.test_type_id`.
///
/// # Errors
///
/// Returns `INVALID_INPUT` without `test_type_id`, `NOT_FOUND`,
/// `DUPLICATE_KEY`, or a validation error.
pub fn create_subject(
    persistence: &Persistence,
    params: &DepartmentPathParams,
    body: &Subject,
    deadline: &Deadline,
) -> ApiResult<Subject> {
    let path: DepartmentPath = params.parse()?;
    info!(
        department_id = path.department_id,
        test_type_id = ?body.test_type_id,
        name = %body.name,
        "Handling create_subject request"
    );
    Ok(persistence.create_subject(path.university_id, path.department_id, body, deadline)?)
}

/// # Errors
///
/// Returns `NOT_FOUND`, `stale_version`, `DUPLICATE_KEY`, or a validation
/// error.
pub fn update_subject(
    persistence: &Persistence,
    params: &SubjectPathParams,
    body: &Subject,
    deadline: &Deadline,
) -> ApiResult<Subject> {
    let (path, subject_id) = params.parse()?;
    ensure_body_id("subject_id", subject_id, body)?;
    info!(subject_id, "Handling update_subject request");
    Ok(persistence.update_subject(
        path.university_id,
        path.department_id,
        subject_id,
        body,
        deadline,
    )?)
}

/// # Errors
///
/// Returns `NOT_FOUND` unless the subject is live below the department.
pub fn delete_subject(
    persistence: &Persistence,
    params: &SubjectPathParams,
    deadline: &Deadline,
) -> ApiResult<()> {
    let (path, subject_id) = params.parse()?;
    info!(subject_id, "Handling delete_subject request");
    Ok(persistence.delete_subject(path.university_id, path.department_id, subject_id, deadline)?)
}

/// Replaces the whole subject set of a test type.
///
/// # Errors
///
/// Returns the first failing subject's validation error, `NOT_FOUND`, or
/// `DUPLICATE_KEY`; nothing is stored on failure.
pub fn batch_update_subjects(
    persistence: &Persistence,
    params: &DepartmentPathParams,
    body: &SubjectBatchRequest,
    deadline: &Deadline,
) -> ApiResult<TestType> {
    let path: DepartmentPath = params.parse()?;
    if body.test_type_id <= 0 {
        return Err(nyushi_domain::CatalogError::invalid_input(
            "test_type_id",
            "test_type_id must be a positive integer",
        )
        .into());
    }
    info!(
        test_type_id = body.test_type_id,
        subjects = body.subjects.len(),
        "Handling batch_update_subjects request"
    );
    Ok(persistence.update_subjects_batch(
        path.university_id,
        path.department_id,
        body.test_type_id,
        &body.subjects,
        deadline,
    )?)
}

// ============================================================================
// Health
// ============================================================================

/// Checks that the database answers.
///
/// # Errors
///
/// Returns the mapped database or timeout error.
pub fn health(persistence: &Persistence, deadline: &Deadline) -> ApiResult<HealthReport> {
    Ok(persistence.ping(deadline)?)
}
