// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Name projections for catalog search.
//!
//! Matching happens in Rust on NFC-normalised text, so these queries only
//! project `(university_id, name)` pairs of live rows. A department or major
//! whose ancestor was soft-deleted is itself soft-deleted by the cascade, so
//! filtering each level on its own `deleted_at` is enough.

use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};

use crate::diesel_schema::{departments, majors, universities};
use crate::error::PersistenceError;

backend_fn! {
/// `(id, name)` of every live university.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn university_names(conn: &mut _) -> Result<Vec<(i64, String)>, PersistenceError> {
    let rows: Vec<(i64, String)> = universities::table
        .filter(universities::deleted_at.is_null())
        .select((universities::id, universities::name))
        .load(conn)?;
    Ok(rows)
}
}

backend_fn! {
/// `(university_id, name)` of every live department.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn department_names(conn: &mut _) -> Result<Vec<(i64, String)>, PersistenceError> {
    let rows: Vec<(i64, String)> = departments::table
        .filter(departments::deleted_at.is_null())
        .select((departments::university_id, departments::name))
        .load(conn)?;
    Ok(rows)
}
}

backend_fn! {
/// `(university_id, name)` of every live major.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn major_names(conn: &mut _) -> Result<Vec<(i64, String)>, PersistenceError> {
    let rows: Vec<(i64, String)> = majors::table
        .inner_join(departments::table)
        .filter(majors::deleted_at.is_null())
        .filter(departments::deleted_at.is_null())
        .select((departments::university_id, majors::name))
        .load(conn)?;
    Ok(rows)
}
}
