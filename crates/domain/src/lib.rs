// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain model of the Nyushi admissions catalog.
//!
//! This crate is pure: it performs no I/O. It defines the entity tree, the
//! error taxonomy, the validators the repository runs before committing, and
//! the parsing helpers used at the request boundary.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod admission_status;
mod error;
mod input;
mod scoring;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use admission_status::AdmissionStatus;
pub use error::{CatalogError, ErrorKind, Violation};
pub use input::{
    SEARCH_QUERY_FORBIDDEN, SEARCH_QUERY_MAX_CHARS, SEARCH_QUERY_REQUIRED, SEARCH_QUERY_TOO_LONG,
    SearchQuery, matches_query, normalize_nfc, parse_id, validate_search_query,
};
pub use scoring::{
    PERCENTAGE_SUM_TOLERANCE, PERCENTAGE_TOLERANCE, percentage_violations, recompute_all,
    recompute_percentages, recompute_subjects, share_of, total_score,
};
pub use types::{
    AdmissionInfo, AdmissionSchedule, Department, Entity, Major, Record, ScheduleName, Subject,
    TestType, TestTypeContainer, TestTypeName, University,
};
pub use validation::{
    DEPARTMENT_NAME_MAX_CHARS, MAJOR_NAME_MAX_CHARS, MAX_ACADEMIC_YEAR, MAX_SCHEDULE_ORDER,
    MAX_VALIDITY_DAYS, MIN_ACADEMIC_YEAR, MIN_SCHEDULE_ORDER, MIN_VALIDITY_DAYS,
    SUBJECT_NAME_MAX_CHARS, UNIVERSITY_NAME_MAX_CHARS, Validate, check_tree,
    collect_department_tree, collect_major_tree, collect_test_type_tree, rule, validate_name,
    validate_non_negative, validate_range,
};
