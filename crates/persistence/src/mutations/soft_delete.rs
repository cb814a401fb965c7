// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk soft deletion.
//!
//! Rows are never physically removed. Marking a row sets `deleted_at`,
//! refreshes `updated_at` and increments `version`; rows already deleted are
//! left untouched.

use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};

use crate::diesel_schema::{
    admission_infos, admission_schedules, departments, majors, subjects, test_types, universities,
};
use crate::error::PersistenceError;

/// Generates one soft-delete leaf per catalog table.
macro_rules! soft_delete_fn {
    ($(#[$meta:meta])* $name:ident, $table:ident) => {
        backend_fn! {
            $(#[$meta])*
            ///
            /// # Errors
            ///
            /// Returns an error if the update fails.
            pub fn $name(
                conn: &mut _,
                ids: &[i64],
                stamp: &str,
            ) -> Result<usize, PersistenceError> {
                if ids.is_empty() {
                    return Ok(0);
                }
                let affected: usize = diesel::update($table::table)
                    .filter($table::id.eq_any(ids))
                    .filter($table::deleted_at.is_null())
                    .set((
                        $table::deleted_at.eq(Some(stamp)),
                        $table::updated_at.eq(stamp),
                        $table::version.eq($table::version + 1_i64),
                    ))
                    .execute(conn)?;
                Ok(affected)
            }
        }
    };
}

soft_delete_fn!(
    /// Soft-deletes the given universities.
    soft_delete_universities,
    universities
);
soft_delete_fn!(
    /// Soft-deletes the given departments.
    soft_delete_departments,
    departments
);
soft_delete_fn!(
    /// Soft-deletes the given majors.
    soft_delete_majors,
    majors
);
soft_delete_fn!(
    /// Soft-deletes the given admission schedules.
    soft_delete_schedules,
    admission_schedules
);
soft_delete_fn!(
    /// Soft-deletes the given admission infos.
    soft_delete_admission_infos,
    admission_infos
);
soft_delete_fn!(
    /// Soft-deletes the given test types.
    soft_delete_test_types,
    test_types
);
soft_delete_fn!(
    /// Soft-deletes the given subjects.
    soft_delete_subjects,
    subjects
);
