// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Assembly of entity trees from level-by-level row loads.
//!
//! A tree of any width costs one query per level. Children are grouped by
//! parent identifier and keep the order their query returned them in.

use std::collections::HashMap;

use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, Department, Entity, Major, Subject, TestType, University,
};

use super::missing;
use crate::data_models::{
    AdmissionInfoRow, AdmissionScheduleRow, DepartmentRow, MajorRow, SubjectRow, TestTypeRow,
    UniversityRow,
};
use crate::error::PersistenceError;
use crate::store::CatalogStore;

fn ids_of<T: Entity>(entities: &[T]) -> Vec<i64> {
    entities.iter().filter_map(Entity::id).collect()
}

fn group_by_parent<T, F>(children: Vec<T>, parent: F) -> HashMap<i64, Vec<T>>
where
    F: Fn(&T) -> Option<i64>,
{
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for child in children {
        if let Some(parent_id) = parent(&child) {
            grouped.entry(parent_id).or_default().push(child);
        }
    }
    grouped
}

fn take_children<T>(grouped: &mut HashMap<i64, Vec<T>>, parent_id: Option<i64>) -> Vec<T> {
    parent_id
        .and_then(|id| grouped.remove(&id))
        .unwrap_or_default()
}

/// Every live university with its full tree.
///
/// # Errors
///
/// Returns an error if a query fails or a stored row is malformed.
pub fn load_all<C: CatalogStore>(conn: &mut C) -> Result<Vec<University>, PersistenceError> {
    let rows: Vec<UniversityRow> = conn.load_live_universities()?;
    assemble_universities(conn, rows)
}

/// The live universities among `ids` with their full trees, ordered by
/// identifier.
///
/// # Errors
///
/// Returns an error if a query fails or a stored row is malformed.
pub fn load_universities<C: CatalogStore>(
    conn: &mut C,
    ids: &[i64],
) -> Result<Vec<University>, PersistenceError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<UniversityRow> = conn.load_universities_by_ids(ids)?;
    assemble_universities(conn, rows)
}

/// One live university with its full tree.
///
/// # Errors
///
/// Returns `NotFound` if the university is missing or soft-deleted.
pub fn load_university<C: CatalogStore>(
    conn: &mut C,
    id: i64,
) -> Result<University, PersistenceError> {
    let row: UniversityRow = conn
        .find_university_row(id)?
        .ok_or_else(|| missing(University::KIND, id))?;
    assemble_universities(conn, vec![row])?
        .pop()
        .ok_or_else(|| missing(University::KIND, id))
}

/// A live test type with its subjects.
///
/// # Errors
///
/// Returns an error if a query fails or a stored row is malformed.
pub fn load_test_type<C: CatalogStore>(
    conn: &mut C,
    row: TestTypeRow,
) -> Result<TestType, PersistenceError> {
    let id: i64 = row.id;
    assemble_test_types(conn, vec![row])?
        .pop()
        .ok_or_else(|| missing(TestType::KIND, id))
}

fn assemble_universities<C: CatalogStore>(
    conn: &mut C,
    rows: Vec<UniversityRow>,
) -> Result<Vec<University>, PersistenceError> {
    let universities: Vec<University> = rows
        .into_iter()
        .map(UniversityRow::into_entity)
        .collect::<Result<_, _>>()?;
    let department_rows: Vec<DepartmentRow> = conn.load_departments(&ids_of(&universities))?;
    let mut departments: HashMap<i64, Vec<Department>> =
        group_by_parent(assemble_departments(conn, department_rows)?, |d| {
            d.university_id
        });

    Ok(universities
        .into_iter()
        .map(|mut university| {
            university.departments = take_children(&mut departments, university.id());
            university
        })
        .collect())
}

/// Departments with their full subtrees.
///
/// # Errors
///
/// Returns an error if a query fails or a stored row is malformed.
pub fn assemble_departments<C: CatalogStore>(
    conn: &mut C,
    rows: Vec<DepartmentRow>,
) -> Result<Vec<Department>, PersistenceError> {
    let departments: Vec<Department> = rows
        .into_iter()
        .map(DepartmentRow::into_entity)
        .collect::<Result<_, _>>()?;
    let major_rows: Vec<MajorRow> = conn.load_majors(&ids_of(&departments))?;
    let mut majors: HashMap<i64, Vec<Major>> =
        group_by_parent(assemble_majors(conn, major_rows)?, |m| m.department_id);

    Ok(departments
        .into_iter()
        .map(|mut department| {
            department.majors = take_children(&mut majors, department.id());
            department
        })
        .collect())
}

/// Majors with their full subtrees.
///
/// # Errors
///
/// Returns an error if a query fails or a stored row is malformed.
pub fn assemble_majors<C: CatalogStore>(
    conn: &mut C,
    rows: Vec<MajorRow>,
) -> Result<Vec<Major>, PersistenceError> {
    let majors: Vec<Major> = rows
        .into_iter()
        .map(MajorRow::into_entity)
        .collect::<Result<_, _>>()?;
    let schedule_rows: Vec<AdmissionScheduleRow> = conn.load_schedules(&ids_of(&majors))?;
    let mut schedules: HashMap<i64, Vec<AdmissionSchedule>> =
        group_by_parent(assemble_schedules(conn, schedule_rows)?, |s| s.major_id);

    Ok(majors
        .into_iter()
        .map(|mut major| {
            major.admission_schedules = take_children(&mut schedules, major.id());
            major
        })
        .collect())
}

fn assemble_schedules<C: CatalogStore>(
    conn: &mut C,
    rows: Vec<AdmissionScheduleRow>,
) -> Result<Vec<AdmissionSchedule>, PersistenceError> {
    let schedules: Vec<AdmissionSchedule> = rows
        .into_iter()
        .map(AdmissionScheduleRow::into_entity)
        .collect::<Result<_, _>>()?;
    let schedule_ids: Vec<i64> = ids_of(&schedules);

    let infos: Vec<AdmissionInfo> = conn
        .load_admission_infos(&schedule_ids)?
        .into_iter()
        .map(AdmissionInfoRow::into_entity)
        .collect::<Result<_, _>>()?;
    let mut infos: HashMap<i64, Vec<AdmissionInfo>> =
        group_by_parent(infos, |i| i.admission_schedule_id);

    let test_type_rows: Vec<TestTypeRow> = conn.load_test_types(&schedule_ids)?;
    let mut test_types: HashMap<i64, Vec<TestType>> =
        group_by_parent(assemble_test_types(conn, test_type_rows)?, |t| {
            t.admission_schedule_id
        });

    Ok(schedules
        .into_iter()
        .map(|mut schedule| {
            schedule.admission_infos = take_children(&mut infos, schedule.id());
            schedule.test_types = take_children(&mut test_types, schedule.id());
            schedule
        })
        .collect())
}

fn assemble_test_types<C: CatalogStore>(
    conn: &mut C,
    rows: Vec<TestTypeRow>,
) -> Result<Vec<TestType>, PersistenceError> {
    let test_types: Vec<TestType> = rows
        .into_iter()
        .map(TestTypeRow::into_entity)
        .collect::<Result<_, _>>()?;
    let subjects: Vec<Subject> = conn
        .load_subjects(&ids_of(&test_types))?
        .into_iter()
        .map(SubjectRow::into_entity)
        .collect::<Result<_, _>>()?;
    let mut subjects: HashMap<i64, Vec<Subject>> = group_by_parent(subjects, |s| s.test_type_id);

    Ok(test_types
        .into_iter()
        .map(|mut test_type| {
            test_type.subjects = take_children(&mut subjects, test_type.id());
            test_type
        })
        .collect())
}
