// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use nyushi_domain::{CatalogError, Entity, ErrorKind, Subject, TestType};

use crate::Persistence;
use crate::tests::{
    SeededIds, create_test_persistence, deadline, percentage_sum, seed_medical_school,
};

fn assert_sums_to_hundred(subjects: &[Subject]) {
    let sum: f64 = percentage_sum(subjects);
    assert!((sum - 100.0).abs() < 1e-6, "percentages sum to {sum}");
}

fn stored_subjects(persistence: &Persistence, ids: &SeededIds) -> Vec<Subject> {
    persistence
        .find_test_type(ids.department, ids.test_type, &deadline())
        .unwrap()
        .subjects
}

fn subject_for(ids: &SeededIds, name: &str, score: i32) -> Subject {
    let mut subject: Subject = Subject::new(name, score);
    subject.test_type_id = Some(ids.test_type);
    subject
}

#[test]
fn test_create_subject_appends_and_recomputes_siblings() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    let created: Subject = persistence
        .create_subject(
            ids.university,
            ids.department,
            &subject_for(&ids, "面接", 450),
            &deadline(),
        )
        .unwrap();

    assert_eq!(created.display_order, 7);
    assert!((created.percentage - 45.0).abs() < 1e-9);
    let subjects: Vec<Subject> = stored_subjects(&persistence, &ids);
    assert_eq!(subjects.len(), 7);
    assert_sums_to_hundred(&subjects);
    let science: &Subject = subjects.iter().find(|s| s.name == "理科").unwrap();
    assert!((science.percentage - 20.0).abs() < 1e-9);
    // recomputed shares leave sibling versions alone
    assert_eq!(science.record.version, 1);
}

#[test]
fn test_create_subject_without_test_type_is_invalid_input() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    let err: CatalogError = persistence
        .create_subject(
            ids.university,
            ids.department,
            &Subject::new("面接", 50),
            &deadline(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_create_subject_with_taken_display_order_is_duplicate_key() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    let err: CatalogError = persistence
        .create_subject(
            ids.university,
            ids.department,
            &subject_for(&ids, "面接", 50).ordered(3),
            &deadline(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    assert_eq!(stored_subjects(&persistence, &ids).len(), 6);
}

#[test]
fn test_create_subject_in_other_department_is_not_found() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);
    let (_, other) = seed_medical_school(&persistence);

    let err: CatalogError = persistence
        .create_subject(
            other.university,
            other.department,
            &subject_for(&ids, "面接", 50),
            &deadline(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_update_subject_recomputes_percentages() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);
    let math: i64 = ids.subjects[2];
    let mut changes: Subject = Subject::new("数学", 550);
    changes.record.version = 1;

    let updated: Subject = persistence
        .update_subject(ids.university, ids.department, math, &changes, &deadline())
        .unwrap();

    assert_eq!(updated.score, 550);
    assert_eq!(updated.display_order, 3);
    assert_eq!(updated.record.version, 2);
    assert!((updated.percentage - 55.0).abs() < 1e-9);
    assert_sums_to_hundred(&stored_subjects(&persistence, &ids));
}

#[test]
fn test_update_subject_with_stale_version_fails() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);
    let mut changes: Subject = Subject::new("数学", 150);
    changes.record.version = 7;

    let err: CatalogError = persistence
        .update_subject(
            ids.university,
            ids.department,
            ids.subjects[2],
            &changes,
            &deadline(),
        )
        .unwrap_err();

    assert_eq!(err.rule(), Some("stale_version"));
    let math: Subject = persistence
        .find_subject(ids.department, ids.subjects[2], &deadline())
        .unwrap();
    assert_eq!(math.score, 100);
}

#[test]
fn test_delete_subject_recomputes_remaining() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    persistence
        .delete_subject(ids.university, ids.department, ids.subjects[4], &deadline())
        .unwrap();

    let subjects: Vec<Subject> = stored_subjects(&persistence, &ids);
    assert_eq!(subjects.len(), 5);
    assert!(subjects.iter().all(|s| s.name != "理科"));
    assert_sums_to_hundred(&subjects);
    let math: &Subject = subjects.iter().find(|s| s.name == "数学").unwrap();
    assert!((math.percentage - 100.0 / 350.0 * 100.0).abs() < 1e-9);
}

#[test]
fn test_batch_replace_matches_by_id_then_name() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);
    let mut math: Subject = Subject::new("数学", 200);
    math.record.id = Some(ids.subjects[2]);
    let incoming: Vec<Subject> = vec![
        Subject::new("英語L", 100),
        math,
        Subject::new("面接", 100),
    ];

    let test_type: TestType = persistence
        .update_subjects_batch(
            ids.university,
            ids.department,
            ids.test_type,
            &incoming,
            &deadline(),
        )
        .unwrap();

    let names: Vec<&str> = test_type.subjects.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["英語L", "数学", "面接"]);
    let orders: Vec<i32> = test_type.subjects.iter().map(|s| s.display_order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(test_type.subjects[0].id(), Some(ids.subjects[0]));
    assert_eq!(test_type.subjects[1].id(), Some(ids.subjects[2]));
    assert!(!ids.subjects.contains(&test_type.subjects[2].id().unwrap()));
    assert!((test_type.subjects[1].percentage - 50.0).abs() < 1e-9);
    assert_sums_to_hundred(&test_type.subjects);
    assert_eq!(
        persistence
            .find_subject(ids.department, ids.subjects[4], &deadline())
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn test_batch_replace_can_swap_display_orders() {
    let persistence: Persistence = create_test_persistence();
    let (created, ids) = seed_medical_school(&persistence);
    let mut incoming: Vec<Subject> = created.departments[0].majors[0].admission_schedules[0]
        .test_types[0]
        .subjects
        .clone();
    incoming.reverse();
    for (index, subject) in incoming.iter_mut().enumerate() {
        subject.display_order = i32::try_from(index).unwrap() + 1;
    }

    let test_type: TestType = persistence
        .update_subjects_batch(
            ids.university,
            ids.department,
            ids.test_type,
            &incoming,
            &deadline(),
        )
        .unwrap();

    let names: Vec<&str> = test_type.subjects.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["地歴公", "理科", "国語", "数学", "英語R", "英語L"]);
    assert!(test_type.subjects.iter().all(|s| s.record.version == 2));
}

#[test]
fn test_batch_replace_with_unknown_id_is_not_found_and_changes_nothing() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);
    let mut ghost: Subject = Subject::new("幽霊", 10);
    ghost.record.id = Some(9_999);

    let err: CatalogError = persistence
        .update_subjects_batch(
            ids.university,
            ids.department,
            ids.test_type,
            &[Subject::new("面接", 100), ghost],
            &deadline(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.operation(), Some("batch_update"));
    assert_eq!(stored_subjects(&persistence, &ids).len(), 6);
}

#[test]
fn test_batch_replace_reports_first_failing_subject() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    let err: CatalogError = persistence
        .update_subjects_batch(
            ids.university,
            ids.department,
            ids.test_type,
            &[
                Subject::new("英語", 100),
                Subject::new("", 100),
                Subject::new("", 100),
            ],
            &deadline(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.violations()[0].field, "subjects[1].name");
    assert_eq!(stored_subjects(&persistence, &ids).len(), 6);
}

#[test]
fn test_batch_replace_with_stale_version_fails() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);
    let mut math: Subject = Subject::new("数学", 200);
    math.record.id = Some(ids.subjects[2]);
    math.record.version = 4;

    let err: CatalogError = persistence
        .update_subjects_batch(
            ids.university,
            ids.department,
            ids.test_type,
            &[math],
            &deadline(),
        )
        .unwrap_err();

    assert_eq!(err.rule(), Some("stale_version"));
}

#[test]
fn test_batch_replace_with_empty_list_clears_subjects() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    let test_type: TestType = persistence
        .update_subjects_batch(ids.university, ids.department, ids.test_type, &[], &deadline())
        .unwrap();

    assert!(test_type.subjects.is_empty());
}
