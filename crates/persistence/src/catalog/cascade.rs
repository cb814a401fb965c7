// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Soft-delete cascade.
//!
//! Deleting a node marks it and every live descendant with the same
//! `deleted_at` stamp inside the caller's transaction. Levels are marked
//! parent before child.

use tracing::debug;

use crate::data_models::now_stamp;
use crate::error::PersistenceError;
use crate::store::CatalogStore;

/// The node a cascade starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeRoot {
    University(i64),
    Department(i64),
    Major(i64),
}

/// Identifiers of every live row reached by a cascade, per level.
#[derive(Debug, Default)]
struct Cascade {
    universities: Vec<i64>,
    departments: Vec<i64>,
    majors: Vec<i64>,
    schedules: Vec<i64>,
    admission_infos: Vec<i64>,
    test_types: Vec<i64>,
    subjects: Vec<i64>,
}

impl Cascade {
    fn collect<C: CatalogStore>(conn: &mut C, root: CascadeRoot) -> Result<Self, PersistenceError> {
        let mut cascade: Self = Self::default();
        match root {
            CascadeRoot::University(id) => cascade.universities.push(id),
            CascadeRoot::Department(id) => cascade.departments.push(id),
            CascadeRoot::Major(id) => cascade.majors.push(id),
        }

        let departments = conn.load_departments(&cascade.universities)?;
        cascade.departments.extend(departments.iter().map(|row| row.id));
        let majors = conn.load_majors(&cascade.departments)?;
        cascade.majors.extend(majors.iter().map(|row| row.id));
        let schedules = conn.load_schedules(&cascade.majors)?;
        cascade.schedules.extend(schedules.iter().map(|row| row.id));
        let infos = conn.load_admission_infos(&cascade.schedules)?;
        cascade.admission_infos.extend(infos.iter().map(|row| row.id));
        let test_types = conn.load_test_types(&cascade.schedules)?;
        cascade.test_types.extend(test_types.iter().map(|row| row.id));
        let subjects = conn.load_subjects(&cascade.test_types)?;
        cascade.subjects.extend(subjects.iter().map(|row| row.id));
        Ok(cascade)
    }

    fn apply<C: CatalogStore>(&self, conn: &mut C, stamp: &str) -> Result<usize, PersistenceError> {
        let mut marked: usize = 0;
        marked += conn.soft_delete_universities(&self.universities, stamp)?;
        marked += conn.soft_delete_departments(&self.departments, stamp)?;
        marked += conn.soft_delete_majors(&self.majors, stamp)?;
        marked += conn.soft_delete_schedules(&self.schedules, stamp)?;
        marked += conn.soft_delete_admission_infos(&self.admission_infos, stamp)?;
        marked += conn.soft_delete_test_types(&self.test_types, stamp)?;
        marked += conn.soft_delete_subjects(&self.subjects, stamp)?;
        Ok(marked)
    }
}

/// Soft-deletes `root` and all of its live descendants.
///
/// The caller must already have verified that `root` is live.
///
/// # Errors
///
/// Returns an error if a query or update fails.
pub fn soft_delete_cascade<C: CatalogStore>(
    conn: &mut C,
    root: CascadeRoot,
) -> Result<usize, PersistenceError> {
    let stamp: String = now_stamp()?;
    let cascade: Cascade = Cascade::collect(conn, root)?;
    let marked: usize = cascade.apply(conn, &stamp)?;
    debug!(?root, marked, "Soft-deleted subtree");
    Ok(marked)
}
