// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row shapes read from and written to the catalog tables, and their
//! conversions into domain entities.

use diesel::prelude::*;
use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, AdmissionStatus, CatalogError, Department, Entity, Major,
    Record, ScheduleName, Subject, TestType, TestTypeName, University,
};
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::diesel_schema::{
    admission_infos, admission_schedules, departments, majors, subjects, test_types, universities,
};
use crate::error::PersistenceError;

/// Current wall-clock time in the stored text form.
///
/// # Errors
///
/// Returns an error if formatting fails.
pub fn now_stamp() -> Result<String, PersistenceError> {
    format_timestamp(OffsetDateTime::now_utc())
}

/// Formats a timestamp as RFC 3339.
///
/// # Errors
///
/// Returns an error if formatting fails.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    Ok(value.format(&Rfc3339)?)
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    Ok(OffsetDateTime::parse(value, &Rfc3339)?)
}

fn record(
    id: i64,
    created_at: &str,
    updated_at: &str,
    deleted_at: Option<&str>,
    version: i64,
) -> Result<Record, PersistenceError> {
    Ok(Record {
        id: Some(id),
        created_at: Some(parse_timestamp(created_at)?),
        updated_at: Some(parse_timestamp(updated_at)?),
        deleted_at: deleted_at.map(parse_timestamp).transpose()?,
        version,
    })
}

fn corrupt(table: &str, id: i64, err: &CatalogError) -> PersistenceError {
    PersistenceError::CorruptRow(format!("{table} row {id}: {}", err.message()))
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = universities)]
pub struct UniversityRow {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub version: i64,
}

impl UniversityRow {
    /// Converts into a university without departments.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored timestamp is malformed.
    pub fn into_entity(self) -> Result<University, PersistenceError> {
        Ok(University {
            record: record(
                self.id,
                &self.created_at,
                &self.updated_at,
                self.deleted_at.as_deref(),
                self.version,
            )?,
            name: self.name,
            departments: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = departments)]
pub struct DepartmentRow {
    pub id: i64,
    pub university_id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub version: i64,
}

impl DepartmentRow {
    /// Converts into a department without majors.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored timestamp is malformed.
    pub fn into_entity(self) -> Result<Department, PersistenceError> {
        Ok(Department {
            record: record(
                self.id,
                &self.created_at,
                &self.updated_at,
                self.deleted_at.as_deref(),
                self.version,
            )?,
            university_id: Some(self.university_id),
            name: self.name,
            majors: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = majors)]
pub struct MajorRow {
    pub id: i64,
    pub department_id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub version: i64,
}

impl MajorRow {
    /// Converts into a major without schedules.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored timestamp is malformed.
    pub fn into_entity(self) -> Result<Major, PersistenceError> {
        Ok(Major {
            record: record(
                self.id,
                &self.created_at,
                &self.updated_at,
                self.deleted_at.as_deref(),
                self.version,
            )?,
            department_id: Some(self.department_id),
            name: self.name,
            admission_schedules: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = admission_schedules)]
pub struct AdmissionScheduleRow {
    pub id: i64,
    pub major_id: i64,
    pub name: String,
    pub display_order: i32,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub version: i64,
}

impl AdmissionScheduleRow {
    /// Converts into a schedule without admission infos or test types.
    ///
    /// # Errors
    ///
    /// Returns an error if the round name or a timestamp is malformed.
    pub fn into_entity(self) -> Result<AdmissionSchedule, PersistenceError> {
        let name: ScheduleName = ScheduleName::from_str(&self.name)
            .map_err(|e| corrupt(AdmissionSchedule::TABLE, self.id, &e))?;
        Ok(AdmissionSchedule {
            record: record(
                self.id,
                &self.created_at,
                &self.updated_at,
                self.deleted_at.as_deref(),
                self.version,
            )?,
            major_id: Some(self.major_id),
            name,
            display_order: self.display_order,
            admission_infos: Vec::new(),
            test_types: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = admission_infos)]
pub struct AdmissionInfoRow {
    pub id: i64,
    pub admission_schedule_id: i64,
    pub academic_year: i32,
    pub valid_from: String,
    pub valid_until: String,
    pub enrollment: i32,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub version: i64,
}

impl AdmissionInfoRow {
    /// # Errors
    ///
    /// Returns an error if the status or a timestamp is malformed.
    pub fn into_entity(self) -> Result<AdmissionInfo, PersistenceError> {
        let status: AdmissionStatus = AdmissionStatus::from_str(&self.status)
            .map_err(|e| corrupt(AdmissionInfo::TABLE, self.id, &e))?;
        Ok(AdmissionInfo {
            record: record(
                self.id,
                &self.created_at,
                &self.updated_at,
                self.deleted_at.as_deref(),
                self.version,
            )?,
            admission_schedule_id: Some(self.admission_schedule_id),
            academic_year: self.academic_year,
            valid_from: parse_timestamp(&self.valid_from)?,
            valid_until: parse_timestamp(&self.valid_until)?,
            enrollment: self.enrollment,
            status,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = test_types)]
pub struct TestTypeRow {
    pub id: i64,
    pub admission_schedule_id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub version: i64,
}

impl TestTypeRow {
    /// Converts into a test type without subjects.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or a timestamp is malformed.
    pub fn into_entity(self) -> Result<TestType, PersistenceError> {
        let name: TestTypeName = TestTypeName::from_str(&self.name)
            .map_err(|e| corrupt(TestType::TABLE, self.id, &e))?;
        Ok(TestType {
            record: record(
                self.id,
                &self.created_at,
                &self.updated_at,
                self.deleted_at.as_deref(),
                self.version,
            )?,
            admission_schedule_id: Some(self.admission_schedule_id),
            name,
            subjects: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subjects)]
pub struct SubjectRow {
    pub id: i64,
    pub test_type_id: i64,
    pub name: String,
    pub score: i32,
    pub percentage: f64,
    pub display_order: i32,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub version: i64,
}

impl SubjectRow {
    /// # Errors
    ///
    /// Returns an error if a stored timestamp is malformed.
    pub fn into_entity(self) -> Result<Subject, PersistenceError> {
        Ok(Subject {
            record: record(
                self.id,
                &self.created_at,
                &self.updated_at,
                self.deleted_at.as_deref(),
                self.version,
            )?,
            test_type_id: Some(self.test_type_id),
            name: self.name,
            score: self.score,
            percentage: self.percentage,
            display_order: self.display_order,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = universities)]
pub struct NewUniversity<'a> {
    pub name: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
    pub version: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartment<'a> {
    pub university_id: i64,
    pub name: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
    pub version: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = majors)]
pub struct NewMajor<'a> {
    pub department_id: i64,
    pub name: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
    pub version: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admission_schedules)]
pub struct NewAdmissionSchedule<'a> {
    pub major_id: i64,
    pub name: &'a str,
    pub display_order: i32,
    pub created_at: &'a str,
    pub updated_at: &'a str,
    pub version: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admission_infos)]
pub struct NewAdmissionInfo<'a> {
    pub admission_schedule_id: i64,
    pub academic_year: i32,
    pub valid_from: &'a str,
    pub valid_until: &'a str,
    pub enrollment: i32,
    pub status: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
    pub version: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = test_types)]
pub struct NewTestType<'a> {
    pub admission_schedule_id: i64,
    pub name: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
    pub version: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = subjects)]
pub struct NewSubject<'a> {
    pub test_type_id: i64,
    pub name: &'a str,
    pub score: i32,
    pub percentage: f64,
    pub display_order: i32,
    pub created_at: &'a str,
    pub updated_at: &'a str,
    pub version: i64,
}

/// Column values written by a versioned admission info update.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = admission_infos)]
pub struct AdmissionInfoChanges<'a> {
    pub academic_year: i32,
    pub valid_from: &'a str,
    pub valid_until: &'a str,
    pub enrollment: i32,
    pub status: &'a str,
    pub updated_at: &'a str,
}

/// Column values written by a versioned subject update.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = subjects)]
pub struct SubjectChanges<'a> {
    pub name: &'a str,
    pub score: i32,
    pub percentage: f64,
    pub display_order: i32,
    pub updated_at: &'a str,
}
