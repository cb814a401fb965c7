// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes on the University → Department → Major levels.

use nyushi_domain::{
    Department, Entity, MAJOR_NAME_MAX_CHARS, Major, University, Validate, Violation, check_tree,
    collect_department_tree, collect_major_tree, recompute_all, validate_name,
};
use tracing::debug;

use super::cascade::{CascadeRoot, soft_delete_cascade};
use super::insert::{
    INITIAL_VERSION, insert_department_tree, insert_major_tree, normalize_department,
    normalize_major, normalize_university,
};
use super::lineage::{department_under, live_university, major_under};
use super::tree::{assemble_departments, assemble_majors, load_university};
use super::{ensure_version, guarded, missing, rejected};
use crate::data_models::{NewUniversity, now_stamp};
use crate::deadline::Deadline;
use crate::error::PersistenceError;
use crate::store::CatalogStore;

/// Re-runs the full tree check on the university that owns a changed
/// subtree.
fn recheck_university<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
) -> Result<(), PersistenceError> {
    let university: University = load_university(conn, university_id)?;
    check_tree(&university).map_err(rejected)
}

fn reload_department<C: CatalogStore>(
    conn: &mut C,
    id: i64,
) -> Result<Department, PersistenceError> {
    let row = conn
        .find_department_row(id)?
        .ok_or_else(|| missing(Department::KIND, id))?;
    assemble_departments(conn, vec![row])?
        .pop()
        .ok_or_else(|| missing(Department::KIND, id))
}

fn reload_major<C: CatalogStore>(conn: &mut C, id: i64) -> Result<Major, PersistenceError> {
    let row = conn
        .find_major_row(id)?
        .ok_or_else(|| missing(Major::KIND, id))?;
    assemble_majors(conn, vec![row])?
        .pop()
        .ok_or_else(|| missing(Major::KIND, id))
}

/// Persists a whole university tree and returns it as stored.
///
/// # Errors
///
/// Returns the tree check violations, `DuplicateKey`, or `Timeout`.
pub fn create_university<C: CatalogStore>(
    conn: &mut C,
    deadline: &Deadline,
    input: &University,
) -> Result<University, PersistenceError> {
    let mut university: University = input.clone();
    normalize_university(&mut university);
    recompute_all(&mut university);
    check_tree(&university).map_err(rejected)?;

    let stamp: String = now_stamp()?;
    let id: i64 = conn.insert_university(&NewUniversity {
        name: &university.name,
        created_at: &stamp,
        updated_at: &stamp,
        version: INITIAL_VERSION,
    })?;
    for department in &university.departments {
        deadline.check("create")?;
        insert_department_tree(conn, id, department, &stamp)?;
    }
    debug!(id, departments = university.departments.len(), "Inserted university tree");
    load_university(conn, id)
}

/// Renames a university.
///
/// # Errors
///
/// Returns `NotFound`, `stale_version`, or a name violation.
pub fn update_university<C: CatalogStore>(
    conn: &mut C,
    id: i64,
    changes: &University,
) -> Result<University, PersistenceError> {
    let stored = live_university(conn, id)?;
    conn.lock_row(University::TABLE, id)?;
    changes.validate().map_err(rejected)?;
    let supplied: i64 = changes.record.version;
    ensure_version(University::KIND, id, supplied, stored.version)?;

    let stamp: String = now_stamp()?;
    let affected: usize = conn.update_university_name(id, supplied, &changes.name, &stamp)?;
    guarded(affected, University::KIND, id, supplied, || {
        Ok(conn.find_university_row(id)?.map(|row| row.version))
    })?;
    load_university(conn, id)
}

/// Soft-deletes a university and its descendants.
///
/// # Errors
///
/// Returns `NotFound` if the university is not live.
pub fn delete_university<C: CatalogStore>(conn: &mut C, id: i64) -> Result<(), PersistenceError> {
    live_university(conn, id)?;
    conn.lock_row(University::TABLE, id)?;
    soft_delete_cascade(conn, CascadeRoot::University(id))?;
    Ok(())
}

/// Adds a department subtree to a university.
///
/// # Errors
///
/// Returns `NotFound` for the university, subtree violations, or
/// `DuplicateKey`.
pub fn create_department<C: CatalogStore>(
    conn: &mut C,
    deadline: &Deadline,
    university_id: i64,
    input: &Department,
) -> Result<Department, PersistenceError> {
    live_university(conn, university_id)?;
    conn.lock_row(University::TABLE, university_id)?;

    let mut department: Department = input.clone();
    normalize_department(&mut department);
    recompute_all(&mut department);
    let mut violations: Vec<Violation> = Vec::new();
    collect_department_tree(&department, "", &mut violations);
    if !violations.is_empty() {
        return Err(rejected(violations));
    }

    let stamp: String = now_stamp()?;
    let id: i64 = insert_department_tree(conn, university_id, &department, &stamp)?;
    deadline.check("create")?;
    recheck_university(conn, university_id)?;
    reload_department(conn, id)
}

/// Renames a department.
///
/// # Errors
///
/// Returns `NotFound`, `stale_version`, or a name violation.
pub fn update_department<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department_id: i64,
    changes: &Department,
) -> Result<Department, PersistenceError> {
    let stored = department_under(conn, university_id, department_id)?;
    conn.lock_row(University::TABLE, university_id)?;
    conn.lock_row(Department::TABLE, department_id)?;
    changes.validate().map_err(rejected)?;
    let supplied: i64 = changes.record.version;
    ensure_version(Department::KIND, department_id, supplied, stored.version)?;

    let stamp: String = now_stamp()?;
    let affected: usize =
        conn.update_department_name(department_id, supplied, &changes.name, &stamp)?;
    guarded(affected, Department::KIND, department_id, supplied, || {
        Ok(conn
            .find_department_row(department_id)?
            .map(|row| row.version))
    })?;
    reload_department(conn, department_id)
}

/// Soft-deletes a department and its descendants.
///
/// # Errors
///
/// Returns `NotFound` unless the department is live under the university.
pub fn delete_department<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department_id: i64,
) -> Result<(), PersistenceError> {
    department_under(conn, university_id, department_id)?;
    conn.lock_row(University::TABLE, university_id)?;
    conn.lock_row(Department::TABLE, department_id)?;
    soft_delete_cascade(conn, CascadeRoot::Department(department_id))?;
    Ok(())
}

/// Adds a major subtree to a department.
///
/// # Errors
///
/// Returns `NotFound` for a parent, subtree violations, or `DuplicateKey`.
pub fn create_major<C: CatalogStore>(
    conn: &mut C,
    deadline: &Deadline,
    university_id: i64,
    department_id: i64,
    input: &Major,
) -> Result<Major, PersistenceError> {
    department_under(conn, university_id, department_id)?;
    conn.lock_row(University::TABLE, university_id)?;
    conn.lock_row(Department::TABLE, department_id)?;

    let mut major: Major = input.clone();
    normalize_major(&mut major);
    recompute_all(&mut major);
    let mut violations: Vec<Violation> = Vec::new();
    collect_major_tree(&major, "", &mut violations);
    if !violations.is_empty() {
        return Err(rejected(violations));
    }

    let stamp: String = now_stamp()?;
    let id: i64 = insert_major_tree(conn, department_id, &major, &stamp)?;
    deadline.check("create")?;
    recheck_university(conn, university_id)?;
    reload_major(conn, id)
}

/// Renames a major.
///
/// # Errors
///
/// Returns `NotFound`, `stale_version`, or a name violation.
pub fn update_major<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department_id: i64,
    major_id: i64,
    changes: &Major,
) -> Result<Major, PersistenceError> {
    department_under(conn, university_id, department_id)?;
    let stored = major_under(conn, department_id, major_id)?;
    conn.lock_row(University::TABLE, university_id)?;
    conn.lock_row(Department::TABLE, department_id)?;
    conn.lock_row(Major::TABLE, major_id)?;

    // Only the name is written, so schedule rules are not re-checked here.
    let mut violations: Vec<Violation> = Vec::new();
    validate_name("name", &changes.name, MAJOR_NAME_MAX_CHARS, &mut violations);
    if !violations.is_empty() {
        return Err(rejected(violations));
    }
    let supplied: i64 = changes.record.version;
    ensure_version(Major::KIND, major_id, supplied, stored.version)?;

    let stamp: String = now_stamp()?;
    let affected: usize = conn.update_major_name(major_id, supplied, &changes.name, &stamp)?;
    guarded(affected, Major::KIND, major_id, supplied, || {
        Ok(conn.find_major_row(major_id)?.map(|row| row.version))
    })?;
    reload_major(conn, major_id)
}

/// Soft-deletes a major and its descendants.
///
/// # Errors
///
/// Returns `NotFound` unless the major is live under the department.
pub fn delete_major<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department_id: i64,
    major_id: i64,
) -> Result<(), PersistenceError> {
    department_under(conn, university_id, department_id)?;
    major_under(conn, department_id, major_id)?;
    conn.lock_row(University::TABLE, university_id)?;
    conn.lock_row(Department::TABLE, department_id)?;
    conn.lock_row(Major::TABLE, major_id)?;
    soft_delete_cascade(conn, CascadeRoot::Major(major_id))?;
    Ok(())
}
