// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ancestry checks for nested resources.
//!
//! A child addressed under the wrong parent is reported exactly like a
//! missing child, so callers cannot discover identifiers across universities.

use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, Department, Entity, ErrorKind, Major, Subject, TestType,
    University,
};

use super::missing;
use crate::data_models::{
    AdmissionInfoRow, AdmissionScheduleRow, DepartmentRow, MajorRow, SubjectRow, TestTypeRow,
    UniversityRow,
};
use crate::error::PersistenceError;
use crate::store::CatalogStore;

/// A test type together with the schedule and major above it.
#[derive(Debug)]
pub struct TestTypeLineage {
    pub test_type: TestTypeRow,
    pub schedule: AdmissionScheduleRow,
    pub major: MajorRow,
}

/// A subject together with the rows above it.
#[derive(Debug)]
pub struct SubjectLineage {
    pub subject: SubjectRow,
    pub parent: TestTypeLineage,
}

/// # Errors
///
/// Returns `NotFound` if the university is missing or soft-deleted.
pub fn live_university<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
) -> Result<UniversityRow, PersistenceError> {
    conn.find_university_row(university_id)?
        .ok_or_else(|| missing(University::KIND, university_id))
}

/// The live department `department_id`, provided it belongs to
/// `university_id`.
///
/// # Errors
///
/// Returns `NotFound` otherwise.
pub fn department_under<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department_id: i64,
) -> Result<DepartmentRow, PersistenceError> {
    conn.find_department_row(department_id)?
        .filter(|row| row.university_id == university_id)
        .ok_or_else(|| missing(Department::KIND, department_id))
}

/// The live major `major_id`, provided it belongs to `department_id`.
///
/// # Errors
///
/// Returns `NotFound` otherwise.
pub fn major_under<C: CatalogStore>(
    conn: &mut C,
    department_id: i64,
    major_id: i64,
) -> Result<MajorRow, PersistenceError> {
    conn.find_major_row(major_id)?
        .filter(|row| row.department_id == department_id)
        .ok_or_else(|| missing(Major::KIND, major_id))
}

/// The live schedule `schedule_id`, provided it belongs to `major_id`.
///
/// # Errors
///
/// Returns `NotFound` otherwise.
pub fn schedule_under<C: CatalogStore>(
    conn: &mut C,
    major_id: i64,
    schedule_id: i64,
) -> Result<AdmissionScheduleRow, PersistenceError> {
    conn.find_schedule_row(schedule_id)?
        .filter(|row| row.major_id == major_id)
        .ok_or_else(|| missing(AdmissionSchedule::KIND, schedule_id))
}

/// The live admission info `info_id`, provided it belongs to `schedule_id`.
///
/// # Errors
///
/// Returns `NotFound` otherwise.
pub fn admission_info_under<C: CatalogStore>(
    conn: &mut C,
    schedule_id: i64,
    info_id: i64,
) -> Result<AdmissionInfoRow, PersistenceError> {
    conn.find_admission_info_row(info_id)?
        .filter(|row| row.admission_schedule_id == schedule_id)
        .ok_or_else(|| missing(AdmissionInfo::KIND, info_id))
}

/// The live test type `test_type_id`, provided it sits below
/// `department_id`.
///
/// # Errors
///
/// Returns `NotFound` otherwise.
pub fn test_type_under<C: CatalogStore>(
    conn: &mut C,
    department_id: i64,
    test_type_id: i64,
) -> Result<TestTypeLineage, PersistenceError> {
    let not_found = || missing(TestType::KIND, test_type_id);
    let test_type: TestTypeRow = conn.find_test_type_row(test_type_id)?.ok_or_else(not_found)?;
    let schedule: AdmissionScheduleRow = conn
        .find_schedule_row(test_type.admission_schedule_id)?
        .ok_or_else(not_found)?;
    let major: MajorRow = conn
        .find_major_row(schedule.major_id)?
        .filter(|row| row.department_id == department_id)
        .ok_or_else(not_found)?;
    Ok(TestTypeLineage {
        test_type,
        schedule,
        major,
    })
}

/// The live subject `subject_id`, provided it sits below `department_id`.
///
/// # Errors
///
/// Returns `NotFound` otherwise.
pub fn subject_under<C: CatalogStore>(
    conn: &mut C,
    department_id: i64,
    subject_id: i64,
) -> Result<SubjectLineage, PersistenceError> {
    let subject: SubjectRow = conn
        .find_subject_row(subject_id)?
        .ok_or_else(|| missing(Subject::KIND, subject_id))?;
    let parent: TestTypeLineage = match test_type_under(conn, department_id, subject.test_type_id)
    {
        Ok(parent) => parent,
        Err(PersistenceError::Catalog(err)) if err.is(ErrorKind::NotFound) => {
            return Err(missing(Subject::KIND, subject_id));
        }
        Err(err) => return Err(err),
    };
    Ok(SubjectLineage { subject, parent })
}
