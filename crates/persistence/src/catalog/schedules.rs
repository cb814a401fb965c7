// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes on admission schedules and admission infos.

use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, Department, Entity, Major, University, Validate,
};

use super::insert::insert_admission_info_row;
use super::lineage::{admission_info_under, department_under, major_under, schedule_under};
use super::{ensure_version, guarded, missing, rejected};
use crate::SchedulePath;
use crate::data_models::{
    AdmissionInfoChanges, AdmissionInfoRow, AdmissionScheduleRow, MajorRow, format_timestamp,
    now_stamp,
};
use crate::error::PersistenceError;
use crate::store::CatalogStore;

/// Verifies the path and locks it from the university down to the schedule.
fn lock_schedule_path<C: CatalogStore>(
    conn: &mut C,
    path: SchedulePath,
) -> Result<(MajorRow, AdmissionScheduleRow), PersistenceError> {
    department_under(conn, path.university_id, path.department_id)?;
    let major: MajorRow = major_under(conn, path.department_id, path.major_id)?;
    let schedule: AdmissionScheduleRow = schedule_under(conn, path.major_id, path.schedule_id)?;
    conn.lock_row(University::TABLE, path.university_id)?;
    conn.lock_row(Department::TABLE, path.department_id)?;
    conn.lock_row(Major::TABLE, path.major_id)?;
    conn.lock_row(AdmissionSchedule::TABLE, path.schedule_id)?;
    Ok((major, schedule))
}

fn reload_info<C: CatalogStore>(conn: &mut C, id: i64) -> Result<AdmissionInfo, PersistenceError> {
    conn.find_admission_info_row(id)?
        .ok_or_else(|| missing(AdmissionInfo::KIND, id))?
        .into_entity()
}

/// Changes round name and display order of a schedule.
///
/// A zero display order is derived from the round name. The result must
/// stay unique among the live schedules of the major.
///
/// # Errors
///
/// Returns `NotFound`, `stale_version`, a range violation, or a duplicate
/// schedule violation (`DuplicateKey`).
pub fn update_admission_schedule<C: CatalogStore>(
    conn: &mut C,
    path: SchedulePath,
    changes: &AdmissionSchedule,
) -> Result<AdmissionSchedule, PersistenceError> {
    let (major_row, stored) = lock_schedule_path(conn, path)?;
    let stored_version: i64 = stored.version;

    let mut candidate: AdmissionSchedule = AdmissionSchedule::new(changes.name);
    if changes.display_order != 0 {
        candidate.display_order = changes.display_order;
    }
    candidate.validate().map_err(rejected)?;

    let mut major: Major = major_row.into_entity()?;
    major.admission_schedules = conn
        .load_schedules(&[path.major_id])?
        .into_iter()
        .map(|row| {
            if row.id == path.schedule_id {
                Ok(candidate.clone())
            } else {
                row.into_entity()
            }
        })
        .collect::<Result<_, _>>()?;
    major.validate().map_err(rejected)?;

    let supplied: i64 = changes.record.version;
    ensure_version(AdmissionSchedule::KIND, path.schedule_id, supplied, stored_version)?;

    let stamp: String = now_stamp()?;
    let affected: usize = conn.update_schedule(
        path.schedule_id,
        supplied,
        candidate.name.as_str(),
        candidate.display_order,
        &stamp,
    )?;
    guarded(affected, AdmissionSchedule::KIND, path.schedule_id, supplied, || {
        Ok(conn
            .find_schedule_row(path.schedule_id)?
            .map(|row| row.version))
    })?;
    conn.find_schedule_row(path.schedule_id)?
        .ok_or_else(|| missing(AdmissionSchedule::KIND, path.schedule_id))?
        .into_entity()
}

/// Adds an admission info to a schedule.
///
/// # Errors
///
/// Returns `NotFound`, or the info's violations (`INVALID_YEAR` when the
/// academic year is the first).
pub fn create_admission_info<C: CatalogStore>(
    conn: &mut C,
    path: SchedulePath,
    info: &AdmissionInfo,
) -> Result<AdmissionInfo, PersistenceError> {
    lock_schedule_path(conn, path)?;
    info.validate().map_err(rejected)?;

    let stamp: String = now_stamp()?;
    let id: i64 = insert_admission_info_row(conn, path.schedule_id, info, &stamp)?;
    reload_info(conn, id)
}

/// Replaces the fields of an admission info.
///
/// # Errors
///
/// Returns `NotFound`, a field violation, `stale_version`, or
/// `invalid_status_transition`.
pub fn update_admission_info<C: CatalogStore>(
    conn: &mut C,
    path: SchedulePath,
    info_id: i64,
    changes: &AdmissionInfo,
) -> Result<AdmissionInfo, PersistenceError> {
    lock_schedule_path(conn, path)?;
    let stored: AdmissionInfoRow = admission_info_under(conn, path.schedule_id, info_id)?;
    conn.lock_row(AdmissionInfo::TABLE, info_id)?;
    changes.validate().map_err(rejected)?;

    let supplied: i64 = changes.record.version;
    ensure_version(AdmissionInfo::KIND, info_id, supplied, stored.version)?;
    let current: AdmissionInfo = stored.into_entity()?;
    let status = current
        .status
        .transition_to(changes.status)
        .map_err(|violation| rejected(vec![violation]))?;

    let stamp: String = now_stamp()?;
    let valid_from: String = format_timestamp(changes.valid_from)?;
    let valid_until: String = format_timestamp(changes.valid_until)?;
    let row: AdmissionInfoChanges<'_> = AdmissionInfoChanges {
        academic_year: changes.academic_year,
        valid_from: &valid_from,
        valid_until: &valid_until,
        enrollment: changes.enrollment,
        status: status.as_str(),
        updated_at: &stamp,
    };
    let affected: usize = conn.update_admission_info(info_id, supplied, &row)?;
    guarded(affected, AdmissionInfo::KIND, info_id, supplied, || {
        Ok(conn
            .find_admission_info_row(info_id)?
            .map(|row| row.version))
    })?;
    reload_info(conn, info_id)
}

/// Soft-deletes an admission info.
///
/// # Errors
///
/// Returns `NotFound` unless the info is live under the schedule.
pub fn delete_admission_info<C: CatalogStore>(
    conn: &mut C,
    path: SchedulePath,
    info_id: i64,
) -> Result<(), PersistenceError> {
    lock_schedule_path(conn, path)?;
    admission_info_under(conn, path.schedule_id, info_id)?;
    conn.lock_row(AdmissionInfo::TABLE, info_id)?;
    let stamp: String = now_stamp()?;
    conn.soft_delete_admission_infos(&[info_id], &stamp)?;
    Ok(())
}
