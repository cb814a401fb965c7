// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Version-guarded updates.

use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};

use crate::data_models::{AdmissionInfoChanges, SubjectChanges};
use crate::diesel_schema::{
    admission_infos, admission_schedules, departments, majors, subjects, universities,
};
use crate::error::PersistenceError;

backend_fn! {
/// Renames a university if it is live and still at `version`.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_university_name(
    conn: &mut _,
    id: i64,
    version: i64,
    name: &str,
    stamp: &str,
) -> Result<usize, PersistenceError> {
    let affected: usize = diesel::update(universities::table)
        .filter(universities::id.eq(id))
        .filter(universities::version.eq(version))
        .filter(universities::deleted_at.is_null())
        .set((
            universities::name.eq(name),
            universities::updated_at.eq(stamp),
            universities::version.eq(universities::version + 1_i64),
        ))
        .execute(conn)?;
    Ok(affected)
}
}

backend_fn! {
/// Renames a department if it is live and still at `version`.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_department_name(
    conn: &mut _,
    id: i64,
    version: i64,
    name: &str,
    stamp: &str,
) -> Result<usize, PersistenceError> {
    let affected: usize = diesel::update(departments::table)
        .filter(departments::id.eq(id))
        .filter(departments::version.eq(version))
        .filter(departments::deleted_at.is_null())
        .set((
            departments::name.eq(name),
            departments::updated_at.eq(stamp),
            departments::version.eq(departments::version + 1_i64),
        ))
        .execute(conn)?;
    Ok(affected)
}
}

backend_fn! {
/// Renames a major if it is live and still at `version`.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_major_name(
    conn: &mut _,
    id: i64,
    version: i64,
    name: &str,
    stamp: &str,
) -> Result<usize, PersistenceError> {
    let affected: usize = diesel::update(majors::table)
        .filter(majors::id.eq(id))
        .filter(majors::version.eq(version))
        .filter(majors::deleted_at.is_null())
        .set((
            majors::name.eq(name),
            majors::updated_at.eq(stamp),
            majors::version.eq(majors::version + 1_i64),
        ))
        .execute(conn)?;
    Ok(affected)
}
}

backend_fn! {
/// Changes round name and display order of a schedule if it is live and
/// still at `version`.
///
/// # Errors
///
/// Returns `DuplicateKey` if another live schedule of the major holds the
/// name or order.
pub fn update_schedule(
    conn: &mut _,
    id: i64,
    version: i64,
    name: &str,
    display_order: i32,
    stamp: &str,
) -> Result<usize, PersistenceError> {
    let affected: usize = diesel::update(admission_schedules::table)
        .filter(admission_schedules::id.eq(id))
        .filter(admission_schedules::version.eq(version))
        .filter(admission_schedules::deleted_at.is_null())
        .set((
            admission_schedules::name.eq(name),
            admission_schedules::display_order.eq(display_order),
            admission_schedules::updated_at.eq(stamp),
            admission_schedules::version.eq(admission_schedules::version + 1_i64),
        ))
        .execute(conn)?;
    Ok(affected)
}
}

backend_fn! {
/// Rewrites an admission info if it is live and still at `version`.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_admission_info(
    conn: &mut _,
    id: i64,
    version: i64,
    changes: &AdmissionInfoChanges<'_>,
) -> Result<usize, PersistenceError> {
    let affected: usize = diesel::update(admission_infos::table)
        .filter(admission_infos::id.eq(id))
        .filter(admission_infos::version.eq(version))
        .filter(admission_infos::deleted_at.is_null())
        .set((
            changes,
            admission_infos::version.eq(admission_infos::version + 1_i64),
        ))
        .execute(conn)?;
    Ok(affected)
}
}

backend_fn! {
/// Rewrites a subject if it is live and still at `version`.
///
/// # Errors
///
/// Returns `DuplicateKey` if the new display order is taken.
pub fn update_subject(
    conn: &mut _,
    id: i64,
    version: i64,
    changes: &SubjectChanges<'_>,
) -> Result<usize, PersistenceError> {
    let affected: usize = diesel::update(subjects::table)
        .filter(subjects::id.eq(id))
        .filter(subjects::version.eq(version))
        .filter(subjects::deleted_at.is_null())
        .set((changes, subjects::version.eq(subjects::version + 1_i64)))
        .execute(conn)?;
    Ok(affected)
}
}

backend_fn! {
/// Stores a recomputed percentage on a sibling subject.
///
/// The version is left alone: the percentage is derived, and a client
/// holding the sibling's version must still be able to edit it.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_subject_percentage(
    conn: &mut _,
    id: i64,
    percentage: f64,
    stamp: &str,
) -> Result<usize, PersistenceError> {
    let affected: usize = diesel::update(subjects::table)
        .filter(subjects::id.eq(id))
        .filter(subjects::deleted_at.is_null())
        .set((
            subjects::percentage.eq(percentage),
            subjects::updated_at.eq(stamp),
        ))
        .execute(conn)?;
    Ok(affected)
}
}

backend_fn! {
/// Moves a subject to `display_order` without touching its version.
///
/// Used to park retained subjects on unique negative positions while a
/// subject set is reordered.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_subject_display_order(
    conn: &mut _,
    id: i64,
    display_order: i32,
) -> Result<usize, PersistenceError> {
    let affected: usize = diesel::update(subjects::table)
        .filter(subjects::id.eq(id))
        .filter(subjects::deleted_at.is_null())
        .set(subjects::display_order.eq(display_order))
        .execute(conn)?;
    Ok(affected)
}
}
