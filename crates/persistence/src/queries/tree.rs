// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Level-by-level loads of the catalog hierarchy.
//!
//! Each query fetches the live children of a whole set of parents in one
//! round trip, so assembling a tree costs one query per level regardless of
//! its width.

use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};

use crate::data_models::{
    AdmissionInfoRow, AdmissionScheduleRow, DepartmentRow, MajorRow, SubjectRow, TestTypeRow,
    UniversityRow,
};
use crate::diesel_schema::{
    admission_infos, admission_schedules, departments, majors, subjects, test_types, universities,
};
use crate::error::PersistenceError;

backend_fn! {
/// Loads every live university, ordered by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_live_universities(conn: &mut _) -> Result<Vec<UniversityRow>, PersistenceError> {
    let rows: Vec<UniversityRow> = universities::table
        .filter(universities::deleted_at.is_null())
        .order(universities::id.asc())
        .select(UniversityRow::as_select())
        .load(conn)?;
    Ok(rows)
}
}

backend_fn! {
/// Loads the live universities among `ids`, ordered by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_universities_by_ids(
    conn: &mut _,
    ids: &[i64],
) -> Result<Vec<UniversityRow>, PersistenceError> {
    let rows: Vec<UniversityRow> = universities::table
        .filter(universities::id.eq_any(ids))
        .filter(universities::deleted_at.is_null())
        .order(universities::id.asc())
        .select(UniversityRow::as_select())
        .load(conn)?;
    Ok(rows)
}
}

backend_fn! {
/// Loads the live departments of the given universities.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_departments(
    conn: &mut _,
    university_ids: &[i64],
) -> Result<Vec<DepartmentRow>, PersistenceError> {
    let rows: Vec<DepartmentRow> = departments::table
        .filter(departments::university_id.eq_any(university_ids))
        .filter(departments::deleted_at.is_null())
        .order(departments::id.asc())
        .select(DepartmentRow::as_select())
        .load(conn)?;
    Ok(rows)
}
}

backend_fn! {
/// Loads the live majors of the given departments.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_majors(
    conn: &mut _,
    department_ids: &[i64],
) -> Result<Vec<MajorRow>, PersistenceError> {
    let rows: Vec<MajorRow> = majors::table
        .filter(majors::department_id.eq_any(department_ids))
        .filter(majors::deleted_at.is_null())
        .order(majors::id.asc())
        .select(MajorRow::as_select())
        .load(conn)?;
    Ok(rows)
}
}

backend_fn! {
/// Loads the live schedules of the given majors, in display order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_schedules(
    conn: &mut _,
    major_ids: &[i64],
) -> Result<Vec<AdmissionScheduleRow>, PersistenceError> {
    let rows: Vec<AdmissionScheduleRow> = admission_schedules::table
        .filter(admission_schedules::major_id.eq_any(major_ids))
        .filter(admission_schedules::deleted_at.is_null())
        .order((
            admission_schedules::display_order.asc(),
            admission_schedules::id.asc(),
        ))
        .select(AdmissionScheduleRow::as_select())
        .load(conn)?;
    Ok(rows)
}
}

backend_fn! {
/// Loads the live admission infos of the given schedules.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_admission_infos(
    conn: &mut _,
    schedule_ids: &[i64],
) -> Result<Vec<AdmissionInfoRow>, PersistenceError> {
    let rows: Vec<AdmissionInfoRow> = admission_infos::table
        .filter(admission_infos::admission_schedule_id.eq_any(schedule_ids))
        .filter(admission_infos::deleted_at.is_null())
        .order(admission_infos::id.asc())
        .select(AdmissionInfoRow::as_select())
        .load(conn)?;
    Ok(rows)
}
}

backend_fn! {
/// Loads the live test types of the given schedules.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_test_types(
    conn: &mut _,
    schedule_ids: &[i64],
) -> Result<Vec<TestTypeRow>, PersistenceError> {
    let rows: Vec<TestTypeRow> = test_types::table
        .filter(test_types::admission_schedule_id.eq_any(schedule_ids))
        .filter(test_types::deleted_at.is_null())
        .order(test_types::id.asc())
        .select(TestTypeRow::as_select())
        .load(conn)?;
    Ok(rows)
}
}

backend_fn! {
/// Loads the live subjects of the given test types, in display order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_subjects(
    conn: &mut _,
    test_type_ids: &[i64],
) -> Result<Vec<SubjectRow>, PersistenceError> {
    let rows: Vec<SubjectRow> = subjects::table
        .filter(subjects::test_type_id.eq_any(test_type_ids))
        .filter(subjects::deleted_at.is_null())
        .order((subjects::display_order.asc(), subjects::id.asc()))
        .select(SubjectRow::as_select())
        .load(conn)?;
    Ok(rows)
}
}
