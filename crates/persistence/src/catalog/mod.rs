// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog operations composed from the query and mutation leaves.
//!
//! Every function here runs inside a transaction opened by `Persistence`
//! and is generic over [`CatalogStore`], so each operation is written once
//! for both backends. Functions return `PersistenceError`; catalog rule
//! failures travel as `PersistenceError::Catalog` so that the transaction
//! rolls back before the error reaches the caller.

mod cascade;
mod hierarchy;
mod insert;
mod lineage;
mod schedules;
mod search;
mod subjects;
mod tree;

pub use hierarchy::{
    create_department, create_major, create_university, delete_department, delete_major,
    delete_university, update_department, update_major, update_university,
};
pub use lineage::{
    admission_info_under, department_under, major_under, schedule_under, subject_under,
    test_type_under,
};
pub use schedules::{
    create_admission_info, delete_admission_info, update_admission_info,
    update_admission_schedule,
};
pub use search::search;
pub use subjects::{create_subject, delete_subject, replace_subjects, update_subject};
pub use tree::{load_all, load_test_type, load_university};

use nyushi_domain::{CatalogError, Violation};

use crate::error::PersistenceError;

/// A row of kind `kind` with identifier `id` is missing or soft-deleted.
fn missing(kind: &str, id: i64) -> PersistenceError {
    PersistenceError::Catalog(CatalogError::not_found(kind, id))
}

/// Wraps violations collected by a validator.
fn rejected(violations: Vec<Violation>) -> PersistenceError {
    PersistenceError::Catalog(CatalogError::from_violations(violations))
}

/// Fails with `stale_version` unless the caller's version matches the stored
/// one.
fn ensure_version(kind: &str, id: i64, supplied: i64, stored: i64) -> Result<(), PersistenceError> {
    if supplied == stored {
        Ok(())
    } else {
        Err(PersistenceError::Catalog(CatalogError::stale_version(
            kind, id, supplied, stored,
        )))
    }
}

/// Interprets the row count of a version-guarded update.
///
/// Zero rows means the row vanished or moved on between the version check
/// and the update; `reload` tells which.
fn guarded<F>(
    affected: usize,
    kind: &str,
    id: i64,
    supplied: i64,
    reload: F,
) -> Result<(), PersistenceError>
where
    F: FnOnce() -> Result<Option<i64>, PersistenceError>,
{
    if affected > 0 {
        return Ok(());
    }
    match reload()? {
        Some(stored) => Err(PersistenceError::Catalog(CatalogError::stale_version(
            kind, id, supplied, stored,
        ))),
        None => Err(missing(kind, id)),
    }
}
