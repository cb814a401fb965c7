// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row inserts.
//!
//! `SQLite` supports `RETURNING` from 3.35 on, so both backends read the new
//! identifier back in the same statement.

use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};

use crate::data_models::{
    NewAdmissionInfo, NewAdmissionSchedule, NewDepartment, NewMajor, NewSubject, NewTestType,
    NewUniversity,
};
use crate::diesel_schema::{
    admission_infos, admission_schedules, departments, majors, subjects, test_types, universities,
};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a university row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_university(conn: &mut _, row: &NewUniversity<'_>) -> Result<i64, PersistenceError> {
    let id: i64 = diesel::insert_into(universities::table)
        .values(row)
        .returning(universities::id)
        .get_result(conn)?;
    Ok(id)
}
}

backend_fn! {
/// Inserts a department row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_department(conn: &mut _, row: &NewDepartment<'_>) -> Result<i64, PersistenceError> {
    let id: i64 = diesel::insert_into(departments::table)
        .values(row)
        .returning(departments::id)
        .get_result(conn)?;
    Ok(id)
}
}

backend_fn! {
/// Inserts a major row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_major(conn: &mut _, row: &NewMajor<'_>) -> Result<i64, PersistenceError> {
    let id: i64 = diesel::insert_into(majors::table)
        .values(row)
        .returning(majors::id)
        .get_result(conn)?;
    Ok(id)
}
}

backend_fn! {
/// Inserts an admission schedule row.
///
/// # Errors
///
/// Returns `DuplicateKey` if the major already has a live schedule with the
/// same name or display order.
pub fn insert_schedule(
    conn: &mut _,
    row: &NewAdmissionSchedule<'_>,
) -> Result<i64, PersistenceError> {
    let id: i64 = diesel::insert_into(admission_schedules::table)
        .values(row)
        .returning(admission_schedules::id)
        .get_result(conn)?;
    Ok(id)
}
}

backend_fn! {
/// Inserts an admission info row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_admission_info(
    conn: &mut _,
    row: &NewAdmissionInfo<'_>,
) -> Result<i64, PersistenceError> {
    let id: i64 = diesel::insert_into(admission_infos::table)
        .values(row)
        .returning(admission_infos::id)
        .get_result(conn)?;
    Ok(id)
}
}

backend_fn! {
/// Inserts a test type row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_test_type(conn: &mut _, row: &NewTestType<'_>) -> Result<i64, PersistenceError> {
    let id: i64 = diesel::insert_into(test_types::table)
        .values(row)
        .returning(test_types::id)
        .get_result(conn)?;
    Ok(id)
}
}

backend_fn! {
/// Inserts a subject row.
///
/// # Errors
///
/// Returns `DuplicateKey` if the display order is taken within the test type.
pub fn insert_subject(conn: &mut _, row: &NewSubject<'_>) -> Result<i64, PersistenceError> {
    let id: i64 = diesel::insert_into(subjects::table)
        .values(row)
        .returning(subjects::id)
        .get_result(conn)?;
    Ok(id)
}
}
