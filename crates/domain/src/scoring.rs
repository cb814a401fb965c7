// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Derived subject percentages.

use crate::error::Violation;
use crate::types::{Subject, TestType, TestTypeContainer};
use crate::validation::rule;

/// Allowed deviation of a single subject's percentage from its exact share.
pub const PERCENTAGE_TOLERANCE: f64 = 1e-6;

/// Allowed deviation of the percentage sum from 100.
pub const PERCENTAGE_SUM_TOLERANCE: f64 = 1e-4;

/// Sum of the scores of `subjects`.
#[must_use]
pub fn total_score(subjects: &[Subject]) -> f64 {
    subjects.iter().map(|s| f64::from(s.score)).sum()
}

/// Exact share of `score` in `total`, in percent. Zero when `total` is zero.
#[must_use]
pub fn share_of(score: i32, total: f64) -> f64 {
    if total > 0.0 {
        f64::from(score) / total * 100.0
    } else {
        0.0
    }
}

/// Rewrites every subject's percentage from its score and the test type total.
pub fn recompute_percentages(test_type: &mut TestType) {
    recompute_subjects(&mut test_type.subjects);
}

/// Same as [`recompute_percentages`] for a bare subject list.
pub fn recompute_subjects(subjects: &mut [Subject]) {
    let total: f64 = total_score(subjects);
    for subject in subjects.iter_mut() {
        subject.percentage = share_of(subject.score, total);
    }
}

/// Recomputes percentages for every test type under `node`.
pub fn recompute_all<T: TestTypeContainer>(node: &mut T) {
    node.visit_test_types_mut(&mut recompute_percentages);
}

/// Checks the percentage invariant for one subject set.
///
/// Each subject must carry its exact share (within [`PERCENTAGE_TOLERANCE`])
/// and, when the total is positive, the shares must sum to 100 (within
/// [`PERCENTAGE_SUM_TOLERANCE`]).
#[must_use]
pub fn percentage_violations(subjects: &[Subject]) -> Vec<Violation> {
    let mut violations: Vec<Violation> = Vec::new();
    if subjects.is_empty() {
        return violations;
    }

    let total: f64 = total_score(subjects);
    for (index, subject) in subjects.iter().enumerate() {
        let expected: f64 = share_of(subject.score, total);
        if (subject.percentage - expected).abs() > PERCENTAGE_TOLERANCE {
            violations.push(Violation::new(
                format!("subjects[{index}].percentage"),
                rule::PERCENTAGE_MISMATCH,
                format!(
                    "percentage of '{}' is {} but its score share is {expected}",
                    subject.name, subject.percentage
                ),
            ));
        }
    }

    if total > 0.0 {
        let sum: f64 = subjects.iter().map(|s| s.percentage).sum();
        if (sum - 100.0).abs() > PERCENTAGE_SUM_TOLERANCE {
            violations.push(Violation::new(
                "subjects",
                rule::PERCENTAGE_MISMATCH,
                format!("subject percentages sum to {sum}, expected 100"),
            ));
        }
    }

    violations
}
