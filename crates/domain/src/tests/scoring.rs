// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::create_medical_subjects;
use crate::{
    PERCENTAGE_SUM_TOLERANCE, Subject, TestType, TestTypeName, Validate, Violation,
    percentage_violations, recompute_percentages, recompute_subjects, rule, share_of, total_score,
};

#[test]
fn test_medical_subject_percentages() {
    let mut test_type: TestType =
        TestType::new(TestTypeName::Common).with_subjects(create_medical_subjects());
    recompute_percentages(&mut test_type);

    let expected: [f64; 6] = [
        50.0 / 550.0 * 100.0,
        50.0 / 550.0 * 100.0,
        100.0 / 550.0 * 100.0,
        100.0 / 550.0 * 100.0,
        200.0 / 550.0 * 100.0,
        50.0 / 550.0 * 100.0,
    ];
    for (subject, want) in test_type.subjects.iter().zip(expected) {
        assert!(
            (subject.percentage - want).abs() < 1e-9,
            "{} got {} want {want}",
            subject.name,
            subject.percentage
        );
    }

    let sum: f64 = test_type.subjects.iter().map(|s| s.percentage).sum();
    assert!((sum - 100.0).abs() < PERCENTAGE_SUM_TOLERANCE);
    assert!(test_type.validate().is_ok());
}

#[test]
fn test_zero_total_yields_zero_percentages() {
    let mut subjects: Vec<Subject> = vec![
        Subject::new("英語", 0).ordered(1),
        Subject::new("数学", 0).ordered(2),
    ];
    recompute_subjects(&mut subjects);

    assert!(total_score(&subjects).abs() < f64::EPSILON);
    assert!(subjects.iter().all(|s| s.percentage.abs() < f64::EPSILON));
    assert!(percentage_violations(&subjects).is_empty());
}

#[test]
fn test_single_subject_takes_everything() {
    let mut subjects: Vec<Subject> = vec![Subject::new("小論文", 300).ordered(1)];
    recompute_subjects(&mut subjects);
    assert!((subjects[0].percentage - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_share_of_handles_empty_total() {
    assert!(share_of(10, 0.0).abs() < f64::EPSILON);
    assert!((share_of(25, 100.0) - 25.0).abs() < f64::EPSILON);
}

#[test]
fn test_stale_percentages_are_reported() {
    let mut subjects: Vec<Subject> = create_medical_subjects();
    recompute_subjects(&mut subjects);
    subjects[2].score = 150;

    let violations: Vec<Violation> = percentage_violations(&subjects);
    assert!(!violations.is_empty());
    assert!(
        violations
            .iter()
            .all(|v| v.rule == rule::PERCENTAGE_MISMATCH)
    );
    assert!(
        violations
            .iter()
            .any(|v| v.field == "subjects[2].percentage")
    );
}

#[test]
fn test_percentages_not_summing_to_100_are_reported() {
    let mut subjects: Vec<Subject> = vec![
        Subject::new("英語", 100).ordered(1),
        Subject::new("数学", 100).ordered(2),
    ];
    subjects[0].percentage = 40.0;
    subjects[1].percentage = 40.0;

    let violations: Vec<Violation> = percentage_violations(&subjects);
    assert!(violations.iter().any(|v| v.field == "subjects"));
}
