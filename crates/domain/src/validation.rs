// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Field and cross-field validation.
//!
//! Every entity implements [`Validate`]: it checks its own fields plus the
//! invariants that span its direct children (schedule uniqueness within a
//! major, ordering and percentages within a test type). [`check_tree`] runs
//! every validator over a whole university and prefixes field paths so the
//! failing node can be located.

use std::collections::{HashMap, HashSet};
use time::Duration;

use crate::error::Violation;
use crate::scoring::percentage_violations;
use crate::types::{
    AdmissionInfo, AdmissionSchedule, Department, Major, ScheduleName, Subject, TestType,
    University,
};

/// Stable rule identifiers reported in [`Violation::rule`].
pub mod rule {
    pub const REQUIRED: &str = "required";
    pub const MAX_LENGTH: &str = "max_length";
    pub const FORBIDDEN_CHARACTER: &str = "forbidden_character";
    pub const OUT_OF_RANGE: &str = "out_of_range";
    pub const NEGATIVE: &str = "negative";
    pub const INVALID_YEAR: &str = "invalid_year";
    pub const VALIDITY_WINDOW: &str = "validity_window";
    pub const DUPLICATE_SCHEDULE_NAME: &str = "duplicate_schedule_name";
    pub const DUPLICATE_SCHEDULE_ORDER: &str = "duplicate_schedule_order";
    pub const DUPLICATE_DISPLAY_ORDER: &str = "duplicate_display_order";
    pub const PERCENTAGE_MISMATCH: &str = "percentage_mismatch";
    pub const STALE_VERSION: &str = "stale_version";
    pub const INVALID_STATUS_TRANSITION: &str = "invalid_status_transition";
}

pub const UNIVERSITY_NAME_MAX_CHARS: usize = 100;
pub const DEPARTMENT_NAME_MAX_CHARS: usize = 50;
pub const MAJOR_NAME_MAX_CHARS: usize = 50;
pub const SUBJECT_NAME_MAX_CHARS: usize = 20;
pub const MIN_ACADEMIC_YEAR: i32 = 2000;
pub const MAX_ACADEMIC_YEAR: i32 = 2100;
pub const MIN_SCHEDULE_ORDER: i32 = 1;
pub const MAX_SCHEDULE_ORDER: i32 = 3;
pub const MIN_VALIDITY_DAYS: i64 = 364;
pub const MAX_VALIDITY_DAYS: i64 = 366;

/// Pure validation of an entity.
pub trait Validate {
    /// Appends every violation found to `out`.
    fn collect_violations(&self, out: &mut Vec<Violation>);

    /// Validates the entity.
    ///
    /// # Errors
    ///
    /// Returns every violation found, in field order.
    fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut violations: Vec<Violation> = Vec::new();
        self.collect_violations(&mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Checks that `value` is a non-blank name of at most `max_chars` characters
/// without control characters.
pub fn validate_name(field: &str, value: &str, max_chars: usize, out: &mut Vec<Violation>) {
    if value.trim().is_empty() {
        out.push(Violation::new(field, rule::REQUIRED, format!("{field} is required")));
        return;
    }
    let chars: usize = value.chars().count();
    if chars > max_chars {
        out.push(Violation::new(
            field,
            rule::MAX_LENGTH,
            format!("{field} must be at most {max_chars} characters (got {chars})"),
        ));
    }
    if value.chars().any(char::is_control) {
        out.push(Violation::new(
            field,
            rule::FORBIDDEN_CHARACTER,
            format!("{field} must not contain control characters"),
        ));
    }
}

/// Checks that `value` lies in `[min, max]`.
pub fn validate_range(field: &str, value: i64, min: i64, max: i64, out: &mut Vec<Violation>) {
    if !(min..=max).contains(&value) {
        out.push(Violation::new(
            field,
            rule::OUT_OF_RANGE,
            format!("{field} must be between {min} and {max} (got {value})"),
        ));
    }
}

pub fn validate_non_negative(field: &str, value: i64, out: &mut Vec<Violation>) {
    if value < 0 {
        out.push(Violation::new(
            field,
            rule::NEGATIVE,
            format!("{field} must not be negative (got {value})"),
        ));
    }
}

impl Validate for University {
    fn collect_violations(&self, out: &mut Vec<Violation>) {
        validate_name("name", &self.name, UNIVERSITY_NAME_MAX_CHARS, out);
    }
}

impl Validate for Department {
    fn collect_violations(&self, out: &mut Vec<Violation>) {
        validate_name("name", &self.name, DEPARTMENT_NAME_MAX_CHARS, out);
    }
}

impl Validate for Major {
    fn collect_violations(&self, out: &mut Vec<Violation>) {
        validate_name("name", &self.name, MAJOR_NAME_MAX_CHARS, out);

        let mut names: HashMap<ScheduleName, usize> = HashMap::new();
        let mut orders: HashMap<i32, usize> = HashMap::new();
        for (index, schedule) in self.admission_schedules.iter().enumerate() {
            if let Some(first) = names.insert(schedule.name, index) {
                out.push(Violation::new(
                    format!("admission_schedules[{index}].name"),
                    rule::DUPLICATE_SCHEDULE_NAME,
                    format!(
                        "admission schedule '{}' already exists at admission_schedules[{first}]",
                        schedule.name
                    ),
                ));
            }
            if let Some(first) = orders.insert(schedule.display_order, index) {
                out.push(Violation::new(
                    format!("admission_schedules[{index}].display_order"),
                    rule::DUPLICATE_SCHEDULE_ORDER,
                    format!(
                        "display_order {} already used by admission_schedules[{first}]",
                        schedule.display_order
                    ),
                ));
            }
        }
    }
}

impl Validate for AdmissionSchedule {
    fn collect_violations(&self, out: &mut Vec<Violation>) {
        validate_range(
            "display_order",
            i64::from(self.display_order),
            i64::from(MIN_SCHEDULE_ORDER),
            i64::from(MAX_SCHEDULE_ORDER),
            out,
        );
    }
}

impl Validate for AdmissionInfo {
    fn collect_violations(&self, out: &mut Vec<Violation>) {
        if !(MIN_ACADEMIC_YEAR..=MAX_ACADEMIC_YEAR).contains(&self.academic_year) {
            out.push(Violation::new(
                "academic_year",
                rule::INVALID_YEAR,
                format!(
                    "academic_year must be between {MIN_ACADEMIC_YEAR} and {MAX_ACADEMIC_YEAR} (got {})",
                    self.academic_year
                ),
            ));
        }

        let window: Duration = self.valid_until - self.valid_from;
        if window <= Duration::ZERO {
            out.push(Violation::new(
                "valid_until",
                rule::VALIDITY_WINDOW,
                "valid_until must be after valid_from",
            ));
        } else if window < Duration::days(MIN_VALIDITY_DAYS)
            || window > Duration::days(MAX_VALIDITY_DAYS)
        {
            out.push(Violation::new(
                "valid_until",
                rule::VALIDITY_WINDOW,
                format!(
                    "validity window must span {MIN_VALIDITY_DAYS} to {MAX_VALIDITY_DAYS} days (got {} days)",
                    window.whole_days()
                ),
            ));
        }

        validate_non_negative("enrollment", i64::from(self.enrollment), out);
    }
}

impl Validate for TestType {
    fn collect_violations(&self, out: &mut Vec<Violation>) {
        let mut orders: HashSet<i32> = HashSet::new();
        for (index, subject) in self.subjects.iter().enumerate() {
            if !orders.insert(subject.display_order) {
                out.push(Violation::new(
                    format!("subjects[{index}].display_order"),
                    rule::DUPLICATE_DISPLAY_ORDER,
                    format!(
                        "display_order {} is used by more than one subject",
                        subject.display_order
                    ),
                ));
            }
        }
        out.extend(percentage_violations(&self.subjects));
    }
}

impl Validate for Subject {
    fn collect_violations(&self, out: &mut Vec<Violation>) {
        validate_name("name", &self.name, SUBJECT_NAME_MAX_CHARS, out);
        validate_non_negative("score", i64::from(self.score), out);
        if self.display_order < 1 {
            out.push(Violation::new(
                "display_order",
                rule::OUT_OF_RANGE,
                format!(
                    "display_order must be a positive integer (got {})",
                    self.display_order
                ),
            ));
        }
        if !(0.0..=100.0).contains(&self.percentage) {
            out.push(Violation::new(
                "percentage",
                rule::OUT_OF_RANGE,
                format!("percentage must be between 0 and 100 (got {})", self.percentage),
            ));
        }
    }
}

fn collect_under<T: Validate>(node: &T, prefix: &str, out: &mut Vec<Violation>) {
    let mut local: Vec<Violation> = Vec::new();
    node.collect_violations(&mut local);
    out.extend(local.into_iter().map(|v| v.under(prefix)));
}

/// Walks a department subtree, prefixing paths with `prefix`.
pub fn collect_department_tree(department: &Department, prefix: &str, out: &mut Vec<Violation>) {
    collect_under(department, prefix, out);
    for (m, major) in department.majors.iter().enumerate() {
        collect_major_tree(major, &join(prefix, &format!("majors[{m}]")), out);
    }
}

/// Walks a major subtree, prefixing paths with `prefix`.
pub fn collect_major_tree(major: &Major, prefix: &str, out: &mut Vec<Violation>) {
    collect_under(major, prefix, out);
    for (s, schedule) in major.admission_schedules.iter().enumerate() {
        let schedule_path: String = join(prefix, &format!("admission_schedules[{s}]"));
        collect_under(schedule, &schedule_path, out);
        for (i, info) in schedule.admission_infos.iter().enumerate() {
            collect_under(info, &join(&schedule_path, &format!("admission_infos[{i}]")), out);
        }
        for (t, test_type) in schedule.test_types.iter().enumerate() {
            collect_test_type_tree(
                test_type,
                &join(&schedule_path, &format!("test_types[{t}]")),
                out,
            );
        }
    }
}

/// Validates a test type and each of its subjects.
pub fn collect_test_type_tree(test_type: &TestType, prefix: &str, out: &mut Vec<Violation>) {
    for (index, subject) in test_type.subjects.iter().enumerate() {
        collect_under(subject, &join(prefix, &format!("subjects[{index}]")), out);
    }
    collect_under(test_type, prefix, out);
}

/// Enforces every entity rule and invariant over a whole university tree.
///
/// # Errors
///
/// Returns all violations found, each with a path locating the failing node.
pub fn check_tree(university: &University) -> Result<(), Vec<Violation>> {
    let mut violations: Vec<Violation> = Vec::new();
    university.collect_violations(&mut violations);
    for (d, department) in university.departments.iter().enumerate() {
        collect_department_tree(department, &format!("departments[{d}]"), &mut violations);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}
