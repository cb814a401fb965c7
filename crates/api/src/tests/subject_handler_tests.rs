// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use nyushi_domain::{Subject, TestType};
use nyushi_persistence::Persistence;

use crate::{
    ApiError, SubjectBatchRequest, batch_update_subjects, create_subject, delete_subject,
    get_subject, update_subject,
};

use super::helpers::{create_test_persistence, deadline, seed_university};

fn percentages(subjects: &[Subject]) -> Vec<f64> {
    subjects.iter().map(|s| s.percentage).collect()
}

#[test]
fn test_create_subject_recomputes_siblings() {
    let persistence: Persistence = create_test_persistence();
    let (_, path) = seed_university(&persistence, "津々大学");

    let mut body: Subject = Subject::new("理科", 500).ordered(4);
    body.test_type_id = Some(path.test_type);
    let created: Subject =
        create_subject(&persistence, &path.department(), &body, &deadline()).unwrap();
    assert!((created.percentage - 50.0).abs() < 1e-9);

    let english: Subject = get_subject(&persistence, &path.subject(0), &deadline()).unwrap();
    assert!((english.percentage - 20.0).abs() < 1e-9);
}

#[test]
fn test_create_subject_without_test_type_is_invalid_input() {
    let persistence: Persistence = create_test_persistence();
    let (_, path) = seed_university(&persistence, "津々大学");

    let err: ApiError = create_subject(
        &persistence,
        &path.department(),
        &Subject::new("理科", 100),
        &deadline(),
    )
    .unwrap_err();
    assert_eq!(err.status, 400);
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn test_create_subject_with_taken_display_order_conflicts() {
    let persistence: Persistence = create_test_persistence();
    let (_, path) = seed_university(&persistence, "津々大学");

    let mut body: Subject = Subject::new("理科", 100).ordered(1);
    body.test_type_id = Some(path.test_type);
    let err: ApiError =
        create_subject(&persistence, &path.department(), &body, &deadline()).unwrap_err();
    assert_eq!(err.status, 409);
    assert_eq!(err.code(), "DUPLICATE_KEY");
}

#[test]
fn test_update_subject_with_mismatched_id_is_rejected() {
    let persistence: Persistence = create_test_persistence();
    let (_, path) = seed_university(&persistence, "津々大学");

    let mut body: Subject = get_subject(&persistence, &path.subject(1), &deadline()).unwrap();
    body.score = 300;
    let err: ApiError =
        update_subject(&persistence, &path.subject(0), &body, &deadline()).unwrap_err();
    assert_eq!(err.status, 400);
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn test_update_and_delete_subject() {
    let persistence: Persistence = create_test_persistence();
    let (_, path) = seed_university(&persistence, "津々大学");

    let mut body: Subject = get_subject(&persistence, &path.subject(2), &deadline()).unwrap();
    body.score = 600;
    let updated: Subject =
        update_subject(&persistence, &path.subject(2), &body, &deadline()).unwrap();
    assert!((updated.percentage - 60.0).abs() < 1e-9);
    assert_eq!(updated.record.version, 2);

    delete_subject(&persistence, &path.subject(2), &deadline()).unwrap();
    let err: ApiError = get_subject(&persistence, &path.subject(2), &deadline()).unwrap_err();
    assert_eq!(err.status, 404);
    let english: Subject = get_subject(&persistence, &path.subject(0), &deadline()).unwrap();
    assert!((english.percentage - 50.0).abs() < 1e-9);
}

#[test]
fn test_batch_update_replaces_subject_set() {
    let persistence: Persistence = create_test_persistence();
    let (created, path) = seed_university(&persistence, "津々大学");
    let existing: Vec<Subject> =
        created.departments[0].majors[0].admission_schedules[0].test_types[0]
            .subjects
            .clone();

    let mut math: Subject = existing[1].clone();
    math.display_order = 1;
    math.score = 300;
    let mut english: Subject = existing[0].clone();
    english.display_order = 2;
    let request: SubjectBatchRequest = SubjectBatchRequest {
        test_type_id: path.test_type,
        subjects: vec![math, english, Subject::new("小論文", 100).ordered(3)],
    };
    let test_type: TestType =
        batch_update_subjects(&persistence, &path.department(), &request, &deadline()).unwrap();

    let names: Vec<&str> = test_type.subjects.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["数学", "英語", "小論文"]);
    let expected: [f64; 3] = [50.0, 200.0 / 6.0, 100.0 / 6.0];
    for (actual, want) in percentages(&test_type.subjects).iter().zip(expected) {
        assert!((actual - want).abs() < 0.01, "{actual} != {want}");
    }
    let total: f64 = percentages(&test_type.subjects).iter().sum();
    assert!((total - 100.0).abs() < 0.01);

    let gone: ApiError = get_subject(&persistence, &path.subject(2), &deadline()).unwrap_err();
    assert_eq!(gone.status, 404);
}

#[test]
fn test_batch_update_rejects_non_positive_test_type() {
    let persistence: Persistence = create_test_persistence();
    let (_, path) = seed_university(&persistence, "津々大学");

    let request: SubjectBatchRequest = SubjectBatchRequest {
        test_type_id: 0,
        subjects: Vec::new(),
    };
    let err: ApiError =
        batch_update_subjects(&persistence, &path.department(), &request, &deadline())
            .unwrap_err();
    assert_eq!(err.status, 400);
    assert_eq!(err.code(), "INVALID_INPUT");
}
