// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response shapes that are not plain catalog entities, and the
//! raw path segments handlers parse into identifiers.

use nyushi_domain::{CatalogError, Subject, University, parse_id};
use nyushi_persistence::SchedulePath;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Query string of the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// The raw search text.
    #[serde(default)]
    pub q: Option<String>,
}

/// Metadata returned alongside search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMeta {
    /// The query as it was matched: trimmed and NFC-normalised.
    pub query: String,
    /// Number of universities returned.
    pub count: usize,
    /// When the response was produced.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Response of the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<University>,
    pub meta: SearchMeta,
}

/// Body of the batch subject replace endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectBatchRequest {
    /// The test type whose subject set is replaced.
    pub test_type_id: i64,
    /// The complete new subject set, in display order.
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

/// Raw path segments addressing a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentPathParams {
    pub university_id: String,
    pub department_id: String,
}

/// Typed identifiers of a department path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepartmentPath {
    pub university_id: i64,
    pub department_id: i64,
}

impl DepartmentPathParams {
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` naming the first malformed segment.
    pub fn parse(&self) -> Result<DepartmentPath, CatalogError> {
        Ok(DepartmentPath {
            university_id: parse_id("university_id", &self.university_id)?,
            department_id: parse_id("department_id", &self.department_id)?,
        })
    }
}

/// Raw path segments addressing a major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorPathParams {
    pub university_id: String,
    pub department_id: String,
    pub major_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MajorPath {
    pub university_id: i64,
    pub department_id: i64,
    pub major_id: i64,
}

impl MajorPathParams {
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` naming the first malformed segment.
    pub fn parse(&self) -> Result<MajorPath, CatalogError> {
        Ok(MajorPath {
            university_id: parse_id("university_id", &self.university_id)?,
            department_id: parse_id("department_id", &self.department_id)?,
            major_id: parse_id("major_id", &self.major_id)?,
        })
    }
}

/// Raw path segments addressing an admission schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePathParams {
    pub university_id: String,
    pub department_id: String,
    pub major_id: String,
    pub schedule_id: String,
}

impl SchedulePathParams {
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` naming the first malformed segment.
    pub fn parse(&self) -> Result<SchedulePath, CatalogError> {
        Ok(SchedulePath {
            university_id: parse_id("university_id", &self.university_id)?,
            department_id: parse_id("department_id", &self.department_id)?,
            major_id: parse_id("major_id", &self.major_id)?,
            schedule_id: parse_id("schedule_id", &self.schedule_id)?,
        })
    }
}

/// Raw path segments addressing an admission info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionInfoPathParams {
    pub university_id: String,
    pub department_id: String,
    pub major_id: String,
    pub schedule_id: String,
    pub info_id: String,
}

impl AdmissionInfoPathParams {
    /// The schedule path and the info identifier.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` naming the first malformed segment.
    pub fn parse(&self) -> Result<(SchedulePath, i64), CatalogError> {
        let schedule: SchedulePath = SchedulePath {
            university_id: parse_id("university_id", &self.university_id)?,
            department_id: parse_id("department_id", &self.department_id)?,
            major_id: parse_id("major_id", &self.major_id)?,
            schedule_id: parse_id("schedule_id", &self.schedule_id)?,
        };
        Ok((schedule, parse_id("info_id", &self.info_id)?))
    }
}

/// Raw path segments addressing a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectPathParams {
    pub university_id: String,
    pub department_id: String,
    pub subject_id: String,
}

impl SubjectPathParams {
    /// The department path and the subject identifier.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` naming the first malformed segment.
    pub fn parse(&self) -> Result<(DepartmentPath, i64), CatalogError> {
        let department: DepartmentPath = DepartmentPath {
            university_id: parse_id("university_id", &self.university_id)?,
            department_id: parse_id("department_id", &self.department_id)?,
        };
        Ok((department, parse_id("subject_id", &self.subject_id)?))
    }
}
