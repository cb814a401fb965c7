// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

use nyushi_domain::{University, rule};
use nyushi_persistence::{Deadline, HealthReport, Persistence};

use crate::{
    ApiError, create_university, delete_university, get_university, health, list_universities,
    update_university,
};

use super::helpers::{create_test_persistence, create_test_university, deadline, seed_university};

#[test]
fn test_create_university_assigns_ids_and_computes_percentages() {
    let persistence: Persistence = create_test_persistence();
    let (created, _) = seed_university(&persistence, "津々大学");

    assert!(created.record.id.is_some());
    assert_eq!(created.record.version, 1);
    let subjects = &created.departments[0].majors[0].admission_schedules[0].test_types[0].subjects;
    let percentages: Vec<f64> = subjects.iter().map(|s| s.percentage).collect();
    assert_eq!(percentages, vec![40.0, 40.0, 20.0]);
}

#[test]
fn test_create_university_rejects_blank_name() {
    let persistence: Persistence = create_test_persistence();
    let err: ApiError =
        create_university(&persistence, &create_test_university("   "), &deadline()).unwrap_err();

    assert_eq!(err.status, 400);
    assert_eq!(err.code(), "VALIDATION_ERROR");
    let details = err.body.details.unwrap();
    assert_eq!(details.violations[0].rule, rule::REQUIRED);
    assert_eq!(details.operation.as_deref(), Some("create"));
    assert!(list_universities(&persistence, &deadline()).unwrap().is_empty());
}

#[test]
fn test_get_university_returns_full_tree() {
    let persistence: Persistence = create_test_persistence();
    let (created, path) = seed_university(&persistence, "津々大学");

    let fetched: University = get_university(&persistence, &path.university, &deadline()).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn test_get_university_with_malformed_id_is_invalid_input() {
    let persistence: Persistence = create_test_persistence();
    for raw in ["abc", "0", "-1", "", "1.5"] {
        let err: ApiError = get_university(&persistence, raw, &deadline()).unwrap_err();
        assert_eq!(err.status, 400, "id {raw:?}");
        assert_eq!(err.code(), "INVALID_INPUT");
    }
}

#[test]
fn test_get_missing_university_is_not_found() {
    let persistence: Persistence = create_test_persistence();
    let err: ApiError = get_university(&persistence, "99", &deadline()).unwrap_err();

    assert_eq!(err.status, 404);
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn test_update_university_increments_version() {
    let persistence: Persistence = create_test_persistence();
    let (created, path) = seed_university(&persistence, "津々大学");

    let mut changes: University = University::new("津々医科大学");
    changes.record.version = created.record.version;
    let updated: University =
        update_university(&persistence, &path.university, &changes, &deadline()).unwrap();

    assert_eq!(updated.name, "津々医科大学");
    assert_eq!(updated.record.version, 2);
    assert_eq!(updated.departments.len(), 1);
}

#[test]
fn test_update_university_with_stale_version_is_rejected() {
    let persistence: Persistence = create_test_persistence();
    let (_, path) = seed_university(&persistence, "津々大学");

    let mut first: University = University::new("一回目");
    first.record.version = 1;
    update_university(&persistence, &path.university, &first, &deadline()).unwrap();

    let mut second: University = University::new("二回目");
    second.record.version = 1;
    let err: ApiError =
        update_university(&persistence, &path.university, &second, &deadline()).unwrap_err();

    assert_eq!(err.status, 400);
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(
        err.body.details.unwrap().violations[0].rule,
        rule::STALE_VERSION
    );
    let stored: University = get_university(&persistence, &path.university, &deadline()).unwrap();
    assert_eq!(stored.name, "一回目");
}

#[test]
fn test_update_university_with_mismatched_body_id_is_rejected() {
    let persistence: Persistence = create_test_persistence();
    let (created, path) = seed_university(&persistence, "津々大学");

    let mut changes: University = University::new("別名");
    changes.record.id = Some(created.record.id.unwrap() + 1);
    changes.record.version = 1;
    let err: ApiError =
        update_university(&persistence, &path.university, &changes, &deadline()).unwrap_err();

    assert_eq!(err.status, 400);
    assert_eq!(err.code(), "INVALID_INPUT");
    let stored: University = get_university(&persistence, &path.university, &deadline()).unwrap();
    assert_eq!(stored.record.version, 1);
}

#[test]
fn test_delete_university_hides_it_from_reads() {
    let persistence: Persistence = create_test_persistence();
    let (_, path) = seed_university(&persistence, "津々大学");
    seed_university(&persistence, "北大学");

    delete_university(&persistence, &path.university, &deadline()).unwrap();

    let err: ApiError = get_university(&persistence, &path.university, &deadline()).unwrap_err();
    assert_eq!(err.status, 404);
    let remaining: Vec<University> = list_universities(&persistence, &deadline()).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "北大学");

    let again: ApiError =
        delete_university(&persistence, &path.university, &deadline()).unwrap_err();
    assert_eq!(again.status, 404);
}

#[test]
fn test_expired_deadline_maps_to_gateway_timeout() {
    let persistence: Persistence = create_test_persistence();
    let expired: Deadline = Deadline::after(Duration::ZERO);
    std::thread::sleep(Duration::from_millis(1));

    let err: ApiError = list_universities(&persistence, &expired).unwrap_err();
    assert_eq!(err.status, 504);
    assert_eq!(err.code(), "TIMEOUT");
}

#[test]
fn test_health_reports_backend() {
    let persistence: Persistence = create_test_persistence();
    let report: HealthReport = health(&persistence, &deadline()).unwrap();

    assert_eq!(report.status, "ok");
    assert_eq!(report.backend, "sqlite");
}
