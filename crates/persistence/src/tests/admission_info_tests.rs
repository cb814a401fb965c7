// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use nyushi_domain::{AdmissionInfo, AdmissionStatus, CatalogError, Entity, ErrorKind};

use crate::Persistence;
use crate::tests::{
    create_test_admission_info, create_test_persistence, deadline, seed_medical_school,
};

#[test]
fn test_create_admission_info_starts_as_draft() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    let created: AdmissionInfo = persistence
        .create_admission_info(
            ids.schedule_path(),
            &create_test_admission_info(2027, 365),
            &deadline(),
        )
        .unwrap();

    assert!(created.id().is_some());
    assert_eq!(created.academic_year, 2027);
    assert_eq!(created.status, AdmissionStatus::Draft);
    assert_eq!(created.admission_schedule_id, Some(ids.schedule));
    assert_eq!(created.record.version, 1);
}

#[test]
fn test_academic_year_outside_range_is_invalid_year() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    for year in [1999, 2101] {
        let err: CatalogError = persistence
            .create_admission_info(
                ids.schedule_path(),
                &create_test_admission_info(year, 365),
                &deadline(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidYear, "year {year}");
    }
}

#[test]
fn test_academic_year_bounds_are_accepted() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    for year in [2000, 2100] {
        persistence
            .create_admission_info(
                ids.schedule_path(),
                &create_test_admission_info(year, 365),
                &deadline(),
            )
            .unwrap();
    }
}

#[test]
fn test_validity_window_must_be_about_one_year() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    for days in [363, 367, 0] {
        let err: CatalogError = persistence
            .create_admission_info(
                ids.schedule_path(),
                &create_test_admission_info(2026, days),
                &deadline(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{days} days");
        assert_eq!(err.rule(), Some("validity_window"));
    }
    for days in [364, 366] {
        assert!(
            persistence
                .create_admission_info(
                    ids.schedule_path(),
                    &create_test_admission_info(2026, days),
                    &deadline(),
                )
                .is_ok(),
            "{days} days"
        );
    }
}

#[test]
fn test_publish_then_archive() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);
    let mut changes: AdmissionInfo = create_test_admission_info(2026, 365);
    changes.status = AdmissionStatus::Published;
    changes.record.version = 1;

    let published: AdmissionInfo = persistence
        .update_admission_info(ids.schedule_path(), ids.admission_info, &changes, &deadline())
        .unwrap();
    assert_eq!(published.status, AdmissionStatus::Published);
    assert_eq!(published.record.version, 2);

    changes.status = AdmissionStatus::Archived;
    changes.record.version = 2;
    let archived: AdmissionInfo = persistence
        .update_admission_info(ids.schedule_path(), ids.admission_info, &changes, &deadline())
        .unwrap();
    assert_eq!(archived.status, AdmissionStatus::Archived);
}

#[test]
fn test_draft_cannot_skip_to_archived() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);
    let mut changes: AdmissionInfo = create_test_admission_info(2026, 365);
    changes.status = AdmissionStatus::Archived;
    changes.record.version = 1;

    let err: CatalogError = persistence
        .update_admission_info(ids.schedule_path(), ids.admission_info, &changes, &deadline())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.rule(), Some("invalid_status_transition"));
}

#[test]
fn test_update_admission_info_with_stale_version_fails() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);
    let mut changes: AdmissionInfo = create_test_admission_info(2026, 365);
    changes.enrollment = 110;
    changes.record.version = 3;

    let err: CatalogError = persistence
        .update_admission_info(ids.schedule_path(), ids.admission_info, &changes, &deadline())
        .unwrap_err();

    assert_eq!(err.rule(), Some("stale_version"));
    let stored: AdmissionInfo = persistence
        .find_admission_info(ids.schedule, ids.admission_info, &deadline())
        .unwrap();
    assert_eq!(stored.enrollment, 100);
}

#[test]
fn test_delete_admission_info_hides_it() {
    let persistence: Persistence = create_test_persistence();
    let (_, ids) = seed_medical_school(&persistence);

    persistence
        .delete_admission_info(ids.schedule_path(), ids.admission_info, &deadline())
        .unwrap();

    let err: CatalogError = persistence
        .find_admission_info(ids.schedule, ids.admission_info, &deadline())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err: CatalogError = persistence
        .delete_admission_info(ids.schedule_path(), ids.admission_info, &deadline())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
