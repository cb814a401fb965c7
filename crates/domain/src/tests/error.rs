// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::error::Error;

use crate::{CatalogError, ErrorKind, Violation, rule};

#[test]
fn test_errors_compare_by_kind_only() {
    let a: CatalogError = CatalogError::new(ErrorKind::NotFound, "University 1 not found");
    let b: CatalogError = CatalogError::new(ErrorKind::NotFound, "something else entirely");
    let c: CatalogError = CatalogError::new(ErrorKind::Database, "University 1 not found");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_codes_are_stable() {
    let expected: [(ErrorKind, &str); 10] = [
        (ErrorKind::NotFound, "NOT_FOUND"),
        (ErrorKind::DuplicateKey, "DUPLICATE_KEY"),
        (ErrorKind::Validation, "VALIDATION_ERROR"),
        (ErrorKind::InvalidYear, "INVALID_YEAR"),
        (ErrorKind::Database, "DATABASE_ERROR"),
        (ErrorKind::Timeout, "TIMEOUT"),
        (ErrorKind::Deadlock, "DEADLOCK"),
        (ErrorKind::InvalidInput, "INVALID_INPUT"),
        (ErrorKind::Authentication, "AUTHENTICATION"),
        (ErrorKind::Authorization, "AUTHORIZATION"),
    ];
    for (kind, code) in expected {
        assert_eq!(kind.code(), code);
        assert_eq!(
            serde_json::to_value(kind).unwrap(),
            serde_json::Value::String(code.to_string())
        );
    }
}

#[test]
fn test_first_violation_decides_kind() {
    let err: CatalogError = CatalogError::from_violations(vec![
        Violation::new("academic_year", rule::INVALID_YEAR, "bad year"),
        Violation::new("valid_until", rule::VALIDITY_WINDOW, "bad window"),
    ]);
    assert_eq!(err.kind(), ErrorKind::InvalidYear);
    assert_eq!(err.violations().len(), 2);
    assert!(err.message().contains("1 more"));

    let err: CatalogError = CatalogError::from_violations(vec![Violation::new(
        "subjects[1].display_order",
        rule::DUPLICATE_DISPLAY_ORDER,
        "dup",
    )]);
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);
}

#[test]
fn test_stale_version_is_a_validation_error() {
    let err: CatalogError = CatalogError::stale_version("University", 1, 3, 4);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.rule(), Some(rule::STALE_VERSION));
    assert!(err.message().contains("stale_version"));
    assert_eq!(err.context().get("id").map(String::as_str), Some("1"));
}

#[test]
fn test_annotations_are_kept() {
    let cause = std::io::Error::other("disk on fire");
    let err: CatalogError = CatalogError::new(ErrorKind::Database, "insert failed")
        .with_operation("create")
        .with_table("subjects")
        .with_table("universities")
        .with_context("test_type_id", "7")
        .with_source(cause);

    assert_eq!(err.operation(), Some("create"));
    // the first table set wins
    assert_eq!(err.table(), Some("subjects"));
    assert_eq!(
        err.context().get("test_type_id").map(String::as_str),
        Some("7")
    );
    assert!(err.source().is_some());
    assert_eq!(
        err.to_string(),
        "DATABASE_ERROR: insert failed (operation=create, table=subjects)"
    );
}

#[test]
fn test_violation_paths_nest() {
    let v: Violation = Violation::new("name", rule::REQUIRED, "name is required")
        .under("majors[0]")
        .under("departments[2]");
    assert_eq!(v.field, "departments[2].majors[0].name");
}
