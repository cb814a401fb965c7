// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Normalisation and insertion of new subtrees.

use num_traits::ToPrimitive;
use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, Department, Major, Subject, TestType, University,
};
use tracing::debug;

use crate::data_models::{
    NewAdmissionInfo, NewAdmissionSchedule, NewDepartment, NewMajor, NewSubject, NewTestType,
    format_timestamp,
};
use crate::error::PersistenceError;
use crate::store::CatalogStore;

/// Version of a freshly inserted row.
pub const INITIAL_VERSION: i64 = 1;

/// 1-based position of the element at `index`.
pub fn position(index: usize) -> i32 {
    (index + 1).to_i32().unwrap_or(i32::MAX)
}

/// Fills omitted subject display orders with their 1-based position.
pub fn assign_subject_orders(subjects: &mut [Subject]) {
    for (index, subject) in subjects.iter_mut().enumerate() {
        if subject.display_order == 0 {
            subject.display_order = position(index);
        }
    }
}

/// Fills omitted display orders throughout a major subtree.
pub fn normalize_major(major: &mut Major) {
    for schedule in &mut major.admission_schedules {
        if schedule.display_order == 0 {
            schedule.display_order = schedule.name.default_display_order();
        }
        for test_type in &mut schedule.test_types {
            assign_subject_orders(&mut test_type.subjects);
        }
    }
}

pub fn normalize_department(department: &mut Department) {
    department.majors.iter_mut().for_each(normalize_major);
}

pub fn normalize_university(university: &mut University) {
    university
        .departments
        .iter_mut()
        .for_each(normalize_department);
}

/// Inserts a department and everything below it.
///
/// # Errors
///
/// Returns an error if an insert fails.
pub fn insert_department_tree<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department: &Department,
    stamp: &str,
) -> Result<i64, PersistenceError> {
    let id: i64 = conn.insert_department(&NewDepartment {
        university_id,
        name: &department.name,
        created_at: stamp,
        updated_at: stamp,
        version: INITIAL_VERSION,
    })?;
    for major in &department.majors {
        insert_major_tree(conn, id, major, stamp)?;
    }
    debug!(id, university_id, "Inserted department");
    Ok(id)
}

/// Inserts a major and everything below it.
///
/// # Errors
///
/// Returns an error if an insert fails.
pub fn insert_major_tree<C: CatalogStore>(
    conn: &mut C,
    department_id: i64,
    major: &Major,
    stamp: &str,
) -> Result<i64, PersistenceError> {
    let id: i64 = conn.insert_major(&NewMajor {
        department_id,
        name: &major.name,
        created_at: stamp,
        updated_at: stamp,
        version: INITIAL_VERSION,
    })?;
    for schedule in &major.admission_schedules {
        insert_schedule_tree(conn, id, schedule, stamp)?;
    }
    debug!(id, department_id, "Inserted major");
    Ok(id)
}

fn insert_schedule_tree<C: CatalogStore>(
    conn: &mut C,
    major_id: i64,
    schedule: &AdmissionSchedule,
    stamp: &str,
) -> Result<i64, PersistenceError> {
    let id: i64 = conn.insert_schedule(&NewAdmissionSchedule {
        major_id,
        name: schedule.name.as_str(),
        display_order: schedule.display_order,
        created_at: stamp,
        updated_at: stamp,
        version: INITIAL_VERSION,
    })?;
    for info in &schedule.admission_infos {
        insert_admission_info_row(conn, id, info, stamp)?;
    }
    for test_type in &schedule.test_types {
        insert_test_type_tree(conn, id, test_type, stamp)?;
    }
    Ok(id)
}

/// Inserts one admission info.
///
/// # Errors
///
/// Returns an error if formatting or the insert fails.
pub fn insert_admission_info_row<C: CatalogStore>(
    conn: &mut C,
    schedule_id: i64,
    info: &AdmissionInfo,
    stamp: &str,
) -> Result<i64, PersistenceError> {
    let valid_from: String = format_timestamp(info.valid_from)?;
    let valid_until: String = format_timestamp(info.valid_until)?;
    conn.insert_admission_info(&NewAdmissionInfo {
        admission_schedule_id: schedule_id,
        academic_year: info.academic_year,
        valid_from: &valid_from,
        valid_until: &valid_until,
        enrollment: info.enrollment,
        status: info.status.as_str(),
        created_at: stamp,
        updated_at: stamp,
        version: INITIAL_VERSION,
    })
}

fn insert_test_type_tree<C: CatalogStore>(
    conn: &mut C,
    schedule_id: i64,
    test_type: &TestType,
    stamp: &str,
) -> Result<i64, PersistenceError> {
    let id: i64 = conn.insert_test_type(&NewTestType {
        admission_schedule_id: schedule_id,
        name: test_type.name.as_str(),
        created_at: stamp,
        updated_at: stamp,
        version: INITIAL_VERSION,
    })?;
    for subject in &test_type.subjects {
        insert_subject_row(conn, id, subject, stamp)?;
    }
    Ok(id)
}

/// Inserts one subject with the percentage it carries.
///
/// # Errors
///
/// Returns `DuplicateKey` if the display order is taken.
pub fn insert_subject_row<C: CatalogStore>(
    conn: &mut C,
    test_type_id: i64,
    subject: &Subject,
    stamp: &str,
) -> Result<i64, PersistenceError> {
    conn.insert_subject(&NewSubject {
        test_type_id,
        name: &subject.name,
        score: subject.score,
        percentage: subject.percentage,
        display_order: subject.display_order,
        created_at: stamp,
        updated_at: stamp,
        version: INITIAL_VERSION,
    })
}
