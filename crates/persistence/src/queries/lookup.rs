// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Single-row lookups.
//!
//! A soft-deleted row is indistinguishable from a missing one: every lookup
//! returns `None` for both.

use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::{PgConnection, SqliteConnection};

use crate::data_models::{
    AdmissionInfoRow, AdmissionScheduleRow, DepartmentRow, MajorRow, SubjectRow, TestTypeRow,
    UniversityRow,
};
use crate::diesel_schema::{
    admission_infos, admission_schedules, departments, majors, subjects, test_types, universities,
};
use crate::error::PersistenceError;

#[derive(QueryableByName)]
struct PingRow {
    #[diesel(sql_type = Integer)]
    #[allow(dead_code)]
    one: i32,
}

backend_fn! {
/// Finds a live university by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_university_row(
    conn: &mut _,
    id: i64,
) -> Result<Option<UniversityRow>, PersistenceError> {
    let row: Option<UniversityRow> = universities::table
        .filter(universities::id.eq(id))
        .filter(universities::deleted_at.is_null())
        .select(UniversityRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}
}

backend_fn! {
/// Finds a live department by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_department_row(
    conn: &mut _,
    id: i64,
) -> Result<Option<DepartmentRow>, PersistenceError> {
    let row: Option<DepartmentRow> = departments::table
        .filter(departments::id.eq(id))
        .filter(departments::deleted_at.is_null())
        .select(DepartmentRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}
}

backend_fn! {
/// Finds a live major by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_major_row(conn: &mut _, id: i64) -> Result<Option<MajorRow>, PersistenceError> {
    let row: Option<MajorRow> = majors::table
        .filter(majors::id.eq(id))
        .filter(majors::deleted_at.is_null())
        .select(MajorRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}
}

backend_fn! {
/// Finds a live admission schedule by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_schedule_row(
    conn: &mut _,
    id: i64,
) -> Result<Option<AdmissionScheduleRow>, PersistenceError> {
    let row: Option<AdmissionScheduleRow> = admission_schedules::table
        .filter(admission_schedules::id.eq(id))
        .filter(admission_schedules::deleted_at.is_null())
        .select(AdmissionScheduleRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}
}

backend_fn! {
/// Finds a live admission info by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_admission_info_row(
    conn: &mut _,
    id: i64,
) -> Result<Option<AdmissionInfoRow>, PersistenceError> {
    let row: Option<AdmissionInfoRow> = admission_infos::table
        .filter(admission_infos::id.eq(id))
        .filter(admission_infos::deleted_at.is_null())
        .select(AdmissionInfoRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}
}

backend_fn! {
/// Finds a live test type by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_test_type_row(
    conn: &mut _,
    id: i64,
) -> Result<Option<TestTypeRow>, PersistenceError> {
    let row: Option<TestTypeRow> = test_types::table
        .filter(test_types::id.eq(id))
        .filter(test_types::deleted_at.is_null())
        .select(TestTypeRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}
}

backend_fn! {
/// Finds a live subject by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_subject_row(conn: &mut _, id: i64) -> Result<Option<SubjectRow>, PersistenceError> {
    let row: Option<SubjectRow> = subjects::table
        .filter(subjects::id.eq(id))
        .filter(subjects::deleted_at.is_null())
        .select(SubjectRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}
}

backend_fn! {
/// Round-trips a constant query.
///
/// # Errors
///
/// Returns an error if the backend cannot answer.
pub fn ping(conn: &mut _) -> Result<(), PersistenceError> {
    diesel::sql_query("SELECT 1 AS one").get_result::<PingRow>(conn)?;
    Ok(())
}
}
