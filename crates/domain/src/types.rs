// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog entities.
//!
//! The hierarchy is University → Department → Major → `AdmissionSchedule` →
//! {`AdmissionInfo`, `TestType` → Subject}. Children are owned by value and
//! refer back to their parent only through a foreign-key identifier; there are
//! no back pointers. Trees are materialised by the persistence layer.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

use crate::admission_status::AdmissionStatus;
use crate::error::CatalogError;

/// Bookkeeping fields shared by every persisted entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier assigned on first persist. `None` until then.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    /// Soft-deletion timestamp. Live records have `None`.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
    /// Optimistic-lock counter.
    #[serde(default)]
    pub version: i64,
}

impl Record {
    /// A record that refers to an already persisted row at `version`.
    #[must_use]
    pub fn persisted(id: i64, version: i64) -> Self {
        Self {
            id: Some(id),
            version,
            ..Self::default()
        }
    }
}

/// Common access to the bookkeeping footer and storage names of an entity.
pub trait Entity {
    /// Human-readable entity name used in messages.
    const KIND: &'static str;
    /// Table holding this entity.
    const TABLE: &'static str;

    fn record(&self) -> &Record;
    fn record_mut(&mut self) -> &mut Record;

    /// The assigned identifier, if persisted.
    fn id(&self) -> Option<i64> {
        self.record().id
    }
}

macro_rules! impl_entity {
    ($ty:ty, $kind:literal, $table:literal) => {
        impl Entity for $ty {
            const KIND: &'static str = $kind;
            const TABLE: &'static str = $table;

            fn record(&self) -> &Record {
                &self.record
            }

            fn record_mut(&mut self) -> &mut Record {
                &mut self.record
            }
        }
    };
}

/// The three standard admission rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScheduleName {
    #[serde(rename = "前期", alias = "early")]
    Early,
    #[serde(rename = "中期", alias = "middle")]
    Middle,
    #[serde(rename = "後期", alias = "late")]
    Late,
}

impl ScheduleName {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Early => "前期",
            Self::Middle => "中期",
            Self::Late => "後期",
        }
    }

    /// Display order conventionally used for this round.
    #[must_use]
    pub const fn default_display_order(&self) -> i32 {
        match self {
            Self::Early => 1,
            Self::Middle => 2,
            Self::Late => 3,
        }
    }
}

impl FromStr for ScheduleName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "前期" | "early" => Ok(Self::Early),
            "中期" | "middle" => Ok(Self::Middle),
            "後期" | "late" => Ok(Self::Late),
            _ => Err(CatalogError::invalid_input(
                "name",
                format!("unknown admission schedule '{s}'"),
            )),
        }
    }
}

impl std::fmt::Display for ScheduleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Examination category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestTypeName {
    /// The nation-wide common examination.
    #[serde(rename = "共通", alias = "common")]
    Common,
    /// The university-specific secondary examination.
    #[serde(rename = "二次", alias = "secondary")]
    Secondary,
}

impl TestTypeName {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "共通",
            Self::Secondary => "二次",
        }
    }
}

impl FromStr for TestTypeName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "共通" | "common" => Ok(Self::Common),
            "二次" | "secondary" => Ok(Self::Secondary),
            _ => Err(CatalogError::invalid_input(
                "name",
                format!("unknown test type '{s}'"),
            )),
        }
    }
}

impl std::fmt::Display for TestTypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A university and its departments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct University {
    #[serde(flatten)]
    pub record: Record,
    pub name: String,
    #[serde(default)]
    pub departments: Vec<Department>,
}

impl University {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            record: Record::default(),
            name: name.into(),
            departments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_department(mut self, department: Department) -> Self {
        self.departments.push(department);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    #[serde(flatten)]
    pub record: Record,
    #[serde(default)]
    pub university_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub majors: Vec<Major>,
}

impl Department {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            record: Record::default(),
            university_id: None,
            name: name.into(),
            majors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_major(mut self, major: Major) -> Self {
        self.majors.push(major);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Major {
    #[serde(flatten)]
    pub record: Record,
    #[serde(default)]
    pub department_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub admission_schedules: Vec<AdmissionSchedule>,
}

impl Major {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            record: Record::default(),
            department_id: None,
            name: name.into(),
            admission_schedules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_schedule(mut self, schedule: AdmissionSchedule) -> Self {
        self.admission_schedules.push(schedule);
        self
    }
}

/// One admission round of a major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionSchedule {
    #[serde(flatten)]
    pub record: Record,
    #[serde(default)]
    pub major_id: Option<i64>,
    pub name: ScheduleName,
    /// Position in [1, 3]. Zero means "derive from the round name".
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub admission_infos: Vec<AdmissionInfo>,
    #[serde(default)]
    pub test_types: Vec<TestType>,
}

impl AdmissionSchedule {
    #[must_use]
    pub const fn new(name: ScheduleName) -> Self {
        Self {
            record: Record {
                id: None,
                created_at: None,
                updated_at: None,
                deleted_at: None,
                version: 0,
            },
            major_id: None,
            name,
            display_order: name.default_display_order(),
            admission_infos: Vec::new(),
            test_types: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_test_type(mut self, test_type: TestType) -> Self {
        self.test_types.push(test_type);
        self
    }

    #[must_use]
    pub fn with_admission_info(mut self, info: AdmissionInfo) -> Self {
        self.admission_infos.push(info);
        self
    }
}

/// Per-year enrollment quota and publication state of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionInfo {
    #[serde(flatten)]
    pub record: Record,
    #[serde(default)]
    pub admission_schedule_id: Option<i64>,
    pub academic_year: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub valid_from: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub valid_until: OffsetDateTime,
    #[serde(default)]
    pub enrollment: i32,
    #[serde(default)]
    pub status: AdmissionStatus,
}

impl AdmissionInfo {
    #[must_use]
    pub fn new(
        academic_year: i32,
        valid_from: OffsetDateTime,
        valid_until: OffsetDateTime,
        enrollment: i32,
    ) -> Self {
        Self {
            record: Record::default(),
            admission_schedule_id: None,
            academic_year,
            valid_from,
            valid_until,
            enrollment,
            status: AdmissionStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestType {
    #[serde(flatten)]
    pub record: Record,
    #[serde(default)]
    pub admission_schedule_id: Option<i64>,
    pub name: TestTypeName,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl TestType {
    #[must_use]
    pub const fn new(name: TestTypeName) -> Self {
        Self {
            record: Record {
                id: None,
                created_at: None,
                updated_at: None,
                deleted_at: None,
                version: 0,
            },
            admission_schedule_id: None,
            name,
            subjects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        self.subjects = subjects;
        self
    }
}

/// An examined subject with its raw score and derived share of the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(flatten)]
    pub record: Record,
    #[serde(default)]
    pub test_type_id: Option<i64>,
    pub name: String,
    pub score: i32,
    /// Derived from the scores of the whole test type; ignored on input.
    #[serde(default)]
    pub percentage: f64,
    /// Positive position within the test type. Zero means "assign".
    #[serde(default)]
    pub display_order: i32,
}

impl Subject {
    #[must_use]
    pub fn new(name: impl Into<String>, score: i32) -> Self {
        Self {
            record: Record::default(),
            test_type_id: None,
            name: name.into(),
            score,
            percentage: 0.0,
            display_order: 0,
        }
    }

    #[must_use]
    pub const fn ordered(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }
}

impl_entity!(University, "University", "universities");
impl_entity!(Department, "Department", "departments");
impl_entity!(Major, "Major", "majors");
impl_entity!(AdmissionSchedule, "AdmissionSchedule", "admission_schedules");
impl_entity!(AdmissionInfo, "AdmissionInfo", "admission_infos");
impl_entity!(TestType, "TestType", "test_types");
impl_entity!(Subject, "Subject", "subjects");

/// Nodes that (transitively) own test types.
pub trait TestTypeContainer {
    /// Calls `f` on every test type below this node.
    fn visit_test_types_mut(&mut self, f: &mut dyn FnMut(&mut TestType));
}

impl TestTypeContainer for AdmissionSchedule {
    fn visit_test_types_mut(&mut self, f: &mut dyn FnMut(&mut TestType)) {
        for test_type in &mut self.test_types {
            f(test_type);
        }
    }
}

impl TestTypeContainer for Major {
    fn visit_test_types_mut(&mut self, f: &mut dyn FnMut(&mut TestType)) {
        for schedule in &mut self.admission_schedules {
            schedule.visit_test_types_mut(f);
        }
    }
}

impl TestTypeContainer for Department {
    fn visit_test_types_mut(&mut self, f: &mut dyn FnMut(&mut TestType)) {
        for major in &mut self.majors {
            major.visit_test_types_mut(f);
        }
    }
}

impl TestTypeContainer for University {
    fn visit_test_types_mut(&mut self, f: &mut dyn FnMut(&mut TestType)) {
        for department in &mut self.departments {
            department.visit_test_types_mut(f);
        }
    }
}
