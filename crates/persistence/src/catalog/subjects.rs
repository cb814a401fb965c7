// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Subject writes.
//!
//! Every change to a subject set recomputes the percentages of the whole
//! test type in the same transaction, so the stored shares always sum to
//! 100 for a test type with a positive score total.

use std::collections::HashSet;

use num_traits::ToPrimitive;
use nyushi_domain::{
    AdmissionSchedule, CatalogError, Department, Entity, Major, Record, Subject, TestType,
    University, Validate, Violation, check_tree, recompute_subjects,
};
use tracing::debug;

use super::insert::{insert_subject_row, position};
use super::lineage::{TestTypeLineage, department_under, subject_under, test_type_under};
use super::tree::{load_test_type, load_university};
use super::{ensure_version, guarded, missing, rejected};
use crate::data_models::{SubjectChanges, SubjectRow, now_stamp};
use crate::deadline::Deadline;
use crate::error::PersistenceError;
use crate::store::CatalogStore;

fn lock_test_type<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department_id: i64,
    lineage: &TestTypeLineage,
) -> Result<(), PersistenceError> {
    conn.lock_row(University::TABLE, university_id)?;
    conn.lock_row(Department::TABLE, department_id)?;
    conn.lock_row(Major::TABLE, lineage.major.id)?;
    conn.lock_row(AdmissionSchedule::TABLE, lineage.schedule.id)?;
    conn.lock_row(TestType::TABLE, lineage.test_type.id)
}

fn live_subjects<C: CatalogStore>(
    conn: &mut C,
    test_type_id: i64,
) -> Result<Vec<Subject>, PersistenceError> {
    conn.load_subjects(&[test_type_id])?
        .into_iter()
        .map(SubjectRow::into_entity)
        .collect()
}

/// Checks one subject, then the set it belongs to.
fn check_subject_set(
    lineage: &TestTypeLineage,
    subjects: Vec<Subject>,
    index: usize,
) -> Result<(), PersistenceError> {
    if let Some(subject) = subjects.get(index) {
        subject.validate().map_err(rejected)?;
    }
    let mut test_type: TestType = lineage.test_type.clone().into_entity()?;
    test_type.subjects = subjects;
    test_type.validate().map_err(rejected)
}

/// Stores recomputed percentages on every subject except `skip`.
fn store_percentages<C: CatalogStore>(
    conn: &mut C,
    subjects: &[Subject],
    skip: Option<i64>,
    stamp: &str,
) -> Result<(), PersistenceError> {
    for subject in subjects {
        if let Some(id) = subject.id().filter(|id| Some(*id) != skip) {
            conn.set_subject_percentage(id, subject.percentage, stamp)?;
        }
    }
    Ok(())
}

fn reload_subject<C: CatalogStore>(conn: &mut C, id: i64) -> Result<Subject, PersistenceError> {
    conn.find_subject_row(id)?
        .ok_or_else(|| missing(Subject::KIND, id))?
        .into_entity()
}

/// Adds a subject to the test type named by `input.test_type_id`.
///
/// A zero display order places the subject after the last one.
///
/// # Errors
///
/// Returns `InvalidInput` without a test type, `NotFound`, a field or set
/// violation, or `DuplicateKey`.
pub fn create_subject<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department_id: i64,
    input: &Subject,
) -> Result<Subject, PersistenceError> {
    department_under(conn, university_id, department_id)?;
    let test_type_id: i64 = input.test_type_id.ok_or_else(|| {
        PersistenceError::Catalog(CatalogError::invalid_input(
            "test_type_id",
            "test_type_id is required",
        ))
    })?;
    let lineage: TestTypeLineage = test_type_under(conn, department_id, test_type_id)?;
    lock_test_type(conn, university_id, department_id, &lineage)?;

    let mut subjects: Vec<Subject> = live_subjects(conn, test_type_id)?;
    let mut subject: Subject = input.clone();
    subject.record = Record::default();
    subject.test_type_id = Some(test_type_id);
    if subject.display_order == 0 {
        subject.display_order = subjects
            .iter()
            .map(|s| s.display_order)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
    }
    subjects.push(subject);
    recompute_subjects(&mut subjects);
    let index: usize = subjects.len() - 1;
    check_subject_set(&lineage, subjects.clone(), index)?;

    let stamp: String = now_stamp()?;
    let id: i64 = insert_subject_row(conn, test_type_id, &subjects[index], &stamp)?;
    store_percentages(conn, &subjects, None, &stamp)?;
    debug!(id, test_type_id, "Inserted subject");
    reload_subject(conn, id)
}

/// Changes name, score, and display order of a subject.
///
/// # Errors
///
/// Returns `NotFound`, a field or set violation, `stale_version`, or
/// `DuplicateKey`.
pub fn update_subject<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department_id: i64,
    subject_id: i64,
    changes: &Subject,
) -> Result<Subject, PersistenceError> {
    department_under(conn, university_id, department_id)?;
    let lineage = subject_under(conn, department_id, subject_id)?;
    let stored_version: i64 = lineage.subject.version;
    let test_type_id: i64 = lineage.subject.test_type_id;
    lock_test_type(conn, university_id, department_id, &lineage.parent)?;
    conn.lock_row(Subject::TABLE, subject_id)?;

    let mut subjects: Vec<Subject> = live_subjects(conn, test_type_id)?;
    let index: usize = subjects
        .iter()
        .position(|s| s.id() == Some(subject_id))
        .ok_or_else(|| missing(Subject::KIND, subject_id))?;
    let target: &mut Subject = &mut subjects[index];
    target.name.clone_from(&changes.name);
    target.score = changes.score;
    if changes.display_order != 0 {
        target.display_order = changes.display_order;
    }
    recompute_subjects(&mut subjects);
    check_subject_set(&lineage.parent, subjects.clone(), index)?;

    let supplied: i64 = changes.record.version;
    ensure_version(Subject::KIND, subject_id, supplied, stored_version)?;

    let stamp: String = now_stamp()?;
    let updated: &Subject = &subjects[index];
    let row: SubjectChanges<'_> = SubjectChanges {
        name: &updated.name,
        score: updated.score,
        percentage: updated.percentage,
        display_order: updated.display_order,
        updated_at: &stamp,
    };
    let affected: usize = conn.update_subject(subject_id, supplied, &row)?;
    guarded(affected, Subject::KIND, subject_id, supplied, || {
        Ok(conn.find_subject_row(subject_id)?.map(|row| row.version))
    })?;
    store_percentages(conn, &subjects, Some(subject_id), &stamp)?;
    reload_subject(conn, subject_id)
}

/// Soft-deletes a subject and recomputes the shares of the rest.
///
/// # Errors
///
/// Returns `NotFound` unless the subject is live below the department.
pub fn delete_subject<C: CatalogStore>(
    conn: &mut C,
    university_id: i64,
    department_id: i64,
    subject_id: i64,
) -> Result<(), PersistenceError> {
    department_under(conn, university_id, department_id)?;
    let lineage = subject_under(conn, department_id, subject_id)?;
    let test_type_id: i64 = lineage.subject.test_type_id;
    lock_test_type(conn, university_id, department_id, &lineage.parent)?;
    conn.lock_row(Subject::TABLE, subject_id)?;

    let stamp: String = now_stamp()?;
    conn.soft_delete_subjects(&[subject_id], &stamp)?;
    let mut remaining: Vec<Subject> = live_subjects(conn, test_type_id)?;
    recompute_subjects(&mut remaining);
    store_percentages(conn, &remaining, None, &stamp)
}

/// Temporary display order that cannot collide with a real one.
fn parked_order(id: i64) -> Result<i32, PersistenceError> {
    id.to_i32().map(|value| -value).ok_or_else(|| {
        PersistenceError::CorruptRow(format!("subject id {id} does not fit a display order"))
    })
}

/// Replaces the subject set of a test type.
///
/// Incoming subjects are matched to live ones by identifier, then by name.
/// An identifier that is not live in this test type is `NotFound`; a
/// non-zero version that differs from the stored one is `stale_version`.
///
/// # Errors
///
/// Returns the first failing subject's violations, `NotFound`,
/// `stale_version`, `DuplicateKey`, or `Timeout`.
pub fn replace_subjects<C: CatalogStore>(
    conn: &mut C,
    deadline: &Deadline,
    university_id: i64,
    department_id: i64,
    test_type_id: i64,
    incoming: &[Subject],
) -> Result<TestType, PersistenceError> {
    department_under(conn, university_id, department_id)?;
    let lineage: TestTypeLineage = test_type_under(conn, department_id, test_type_id)?;
    lock_test_type(conn, university_id, department_id, &lineage)?;

    let live: Vec<SubjectRow> = conn.load_subjects(&[test_type_id])?;
    let mut claimed: HashSet<i64> = HashSet::new();
    let mut next: Vec<Subject> = Vec::with_capacity(incoming.len());
    let mut stored_versions: Vec<Option<i64>> = Vec::with_capacity(incoming.len());

    for (index, subject) in incoming.iter().enumerate() {
        let existing: Option<&SubjectRow> = match subject.id() {
            Some(id) => Some(
                live.iter()
                    .find(|row| row.id == id && !claimed.contains(&row.id))
                    .ok_or_else(|| missing(Subject::KIND, id))?,
            ),
            None => live
                .iter()
                .find(|row| row.name == subject.name && !claimed.contains(&row.id)),
        };

        let mut candidate: Subject = subject.clone();
        candidate.record = Record::default();
        candidate.test_type_id = Some(test_type_id);
        if candidate.display_order == 0 {
            candidate.display_order = position(index);
        }
        if let Some(row) = existing {
            let supplied: i64 = subject.record.version;
            if supplied != 0 {
                ensure_version(Subject::KIND, row.id, supplied, row.version)?;
            }
            claimed.insert(row.id);
            candidate.record.id = Some(row.id);
        }
        stored_versions.push(existing.map(|row| row.version));
        next.push(candidate);
    }

    recompute_subjects(&mut next);
    for (index, subject) in next.iter().enumerate() {
        if let Err(violations) = subject.validate() {
            let prefix: String = format!("subjects[{index}]");
            return Err(rejected(
                violations
                    .into_iter()
                    .map(|violation| violation.under(&prefix))
                    .collect::<Vec<Violation>>(),
            ));
        }
    }
    let mut candidate_set: TestType = lineage.test_type.clone().into_entity()?;
    candidate_set.subjects.clone_from(&next);
    candidate_set.validate().map_err(rejected)?;
    deadline.check("batch_update")?;

    let stamp: String = now_stamp()?;
    let removed: Vec<i64> = live
        .iter()
        .map(|row| row.id)
        .filter(|id| !claimed.contains(id))
        .collect();
    conn.soft_delete_subjects(&removed, &stamp)?;

    // Retained subjects may swap positions; move them out of the way first.
    for id in next.iter().filter_map(Entity::id) {
        conn.set_subject_display_order(id, parked_order(id)?)?;
    }

    for (subject, stored_version) in next.iter().zip(&stored_versions) {
        match (subject.id(), stored_version) {
            (Some(id), Some(version)) => {
                let row: SubjectChanges<'_> = SubjectChanges {
                    name: &subject.name,
                    score: subject.score,
                    percentage: subject.percentage,
                    display_order: subject.display_order,
                    updated_at: &stamp,
                };
                let affected: usize = conn.update_subject(id, *version, &row)?;
                guarded(affected, Subject::KIND, id, *version, || {
                    Ok(conn.find_subject_row(id)?.map(|row| row.version))
                })?;
            }
            _ => {
                insert_subject_row(conn, test_type_id, subject, &stamp)?;
            }
        }
    }
    deadline.check("batch_update")?;

    let university: University = load_university(conn, university_id)?;
    check_tree(&university).map_err(rejected)?;

    debug!(
        test_type_id,
        kept = claimed.len(),
        removed = removed.len(),
        inserted = next.len() - claimed.len(),
        "Replaced subject set"
    );
    let row = conn
        .find_test_type_row(test_type_id)?
        .ok_or_else(|| missing(TestType::KIND, test_type_id))?;
    load_test_type(conn, row)
}
