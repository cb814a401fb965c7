// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-dispatching facade over the query and mutation leaves.
//!
//! `backend_fn!` stamps every leaf out once per backend. Operations that
//! chain many leaves inside one transaction are written once, generic over
//! [`CatalogStore`], and the trait routes each call to the `_sqlite` or `_pg`
//! twin of the leaf with the same name.

use diesel::{PgConnection, SqliteConnection};

use crate::backend::PersistenceBackend;
use crate::data_models::{
    AdmissionInfoChanges, AdmissionInfoRow, AdmissionScheduleRow, DepartmentRow, MajorRow,
    NewAdmissionInfo, NewAdmissionSchedule, NewDepartment, NewMajor, NewSubject, NewTestType,
    NewUniversity, SubjectChanges, SubjectRow, TestTypeRow, UniversityRow,
};
use crate::error::PersistenceError;
use crate::mutations::*;
use crate::queries::*;

macro_rules! catalog_store {
    ($(
        $(#[$meta:meta])*
        fn $name:ident(&mut self $(, $param:ident : $ty:ty)* $(,)?) -> $ret:ty;
    )*) => {
        /// Catalog leaves callable on either backend connection.
        pub trait CatalogStore: PersistenceBackend {
            $(
                $(#[$meta])*
                fn $name(&mut self $(, $param: $ty)*) -> $ret;
            )*
        }

        impl CatalogStore for SqliteConnection {
            $(
                fn $name(&mut self $(, $param: $ty)*) -> $ret {
                    pastey::paste! { [<$name _sqlite>](self $(, $param)*) }
                }
            )*
        }

        impl CatalogStore for PgConnection {
            $(
                fn $name(&mut self $(, $param: $ty)*) -> $ret {
                    pastey::paste! { [<$name _pg>](self $(, $param)*) }
                }
            )*
        }
    };
}

catalog_store! {
    fn ping(&mut self) -> Result<(), PersistenceError>;

    // Tree loads
    fn load_live_universities(&mut self) -> Result<Vec<UniversityRow>, PersistenceError>;
    fn load_universities_by_ids(
        &mut self,
        ids: &[i64],
    ) -> Result<Vec<UniversityRow>, PersistenceError>;
    fn load_departments(
        &mut self,
        university_ids: &[i64],
    ) -> Result<Vec<DepartmentRow>, PersistenceError>;
    fn load_majors(&mut self, department_ids: &[i64]) -> Result<Vec<MajorRow>, PersistenceError>;
    fn load_schedules(
        &mut self,
        major_ids: &[i64],
    ) -> Result<Vec<AdmissionScheduleRow>, PersistenceError>;
    fn load_admission_infos(
        &mut self,
        schedule_ids: &[i64],
    ) -> Result<Vec<AdmissionInfoRow>, PersistenceError>;
    fn load_test_types(
        &mut self,
        schedule_ids: &[i64],
    ) -> Result<Vec<TestTypeRow>, PersistenceError>;
    fn load_subjects(
        &mut self,
        test_type_ids: &[i64],
    ) -> Result<Vec<SubjectRow>, PersistenceError>;

    // Lookups
    fn find_university_row(&mut self, id: i64) -> Result<Option<UniversityRow>, PersistenceError>;
    fn find_department_row(&mut self, id: i64) -> Result<Option<DepartmentRow>, PersistenceError>;
    fn find_major_row(&mut self, id: i64) -> Result<Option<MajorRow>, PersistenceError>;
    fn find_schedule_row(
        &mut self,
        id: i64,
    ) -> Result<Option<AdmissionScheduleRow>, PersistenceError>;
    fn find_admission_info_row(
        &mut self,
        id: i64,
    ) -> Result<Option<AdmissionInfoRow>, PersistenceError>;
    fn find_test_type_row(&mut self, id: i64) -> Result<Option<TestTypeRow>, PersistenceError>;
    fn find_subject_row(&mut self, id: i64) -> Result<Option<SubjectRow>, PersistenceError>;

    // Search projections
    fn university_names(&mut self) -> Result<Vec<(i64, String)>, PersistenceError>;
    fn department_names(&mut self) -> Result<Vec<(i64, String)>, PersistenceError>;
    fn major_names(&mut self) -> Result<Vec<(i64, String)>, PersistenceError>;

    // Inserts
    fn insert_university(&mut self, row: &NewUniversity<'_>) -> Result<i64, PersistenceError>;
    fn insert_department(&mut self, row: &NewDepartment<'_>) -> Result<i64, PersistenceError>;
    fn insert_major(&mut self, row: &NewMajor<'_>) -> Result<i64, PersistenceError>;
    fn insert_schedule(
        &mut self,
        row: &NewAdmissionSchedule<'_>,
    ) -> Result<i64, PersistenceError>;
    fn insert_admission_info(
        &mut self,
        row: &NewAdmissionInfo<'_>,
    ) -> Result<i64, PersistenceError>;
    fn insert_test_type(&mut self, row: &NewTestType<'_>) -> Result<i64, PersistenceError>;
    fn insert_subject(&mut self, row: &NewSubject<'_>) -> Result<i64, PersistenceError>;

    // Guarded updates
    fn update_university_name(
        &mut self,
        id: i64,
        version: i64,
        name: &str,
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn update_department_name(
        &mut self,
        id: i64,
        version: i64,
        name: &str,
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn update_major_name(
        &mut self,
        id: i64,
        version: i64,
        name: &str,
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn update_schedule(
        &mut self,
        id: i64,
        version: i64,
        name: &str,
        display_order: i32,
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn update_admission_info(
        &mut self,
        id: i64,
        version: i64,
        changes: &AdmissionInfoChanges<'_>,
    ) -> Result<usize, PersistenceError>;
    fn update_subject(
        &mut self,
        id: i64,
        version: i64,
        changes: &SubjectChanges<'_>,
    ) -> Result<usize, PersistenceError>;
    fn set_subject_percentage(
        &mut self,
        id: i64,
        percentage: f64,
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn set_subject_display_order(
        &mut self,
        id: i64,
        display_order: i32,
    ) -> Result<usize, PersistenceError>;

    // Soft deletes
    fn soft_delete_universities(
        &mut self,
        ids: &[i64],
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn soft_delete_departments(
        &mut self,
        ids: &[i64],
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn soft_delete_majors(&mut self, ids: &[i64], stamp: &str) -> Result<usize, PersistenceError>;
    fn soft_delete_schedules(
        &mut self,
        ids: &[i64],
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn soft_delete_admission_infos(
        &mut self,
        ids: &[i64],
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn soft_delete_test_types(
        &mut self,
        ids: &[i64],
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
    fn soft_delete_subjects(
        &mut self,
        ids: &[i64],
        stamp: &str,
    ) -> Result<usize, PersistenceError>;
}
