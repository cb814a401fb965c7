// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use crate::{AdmissionStatus, ErrorKind, rule};

#[test]
fn test_draft_can_be_published() {
    assert_eq!(
        AdmissionStatus::Draft.publish(),
        Ok(AdmissionStatus::Published)
    );
}

#[test]
fn test_published_can_be_archived_or_reverted() {
    assert_eq!(
        AdmissionStatus::Published.archive(),
        Ok(AdmissionStatus::Archived)
    );
    assert_eq!(
        AdmissionStatus::Published.revert(),
        Ok(AdmissionStatus::Draft)
    );
}

#[test]
fn test_archived_is_terminal() {
    assert!(AdmissionStatus::Archived.is_terminal());
    for target in [AdmissionStatus::Draft, AdmissionStatus::Published] {
        let err = AdmissionStatus::Archived.transition_to(target).unwrap_err();
        assert_eq!(err.rule, rule::INVALID_STATUS_TRANSITION);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn test_draft_cannot_skip_to_archived() {
    assert!(!AdmissionStatus::Draft.can_transition_to(AdmissionStatus::Archived));
    assert!(AdmissionStatus::Draft.archive().is_err());
}

#[test]
fn test_staying_in_place_is_allowed() {
    for status in [
        AdmissionStatus::Draft,
        AdmissionStatus::Published,
        AdmissionStatus::Archived,
    ] {
        assert_eq!(status.transition_to(status), Ok(status));
    }
}

#[test]
fn test_strict_operations_reject_wrong_origin() {
    assert!(AdmissionStatus::Published.publish().is_err());
    assert!(AdmissionStatus::Draft.revert().is_err());
    assert!(AdmissionStatus::Archived.archive().is_err());
}

#[test]
fn test_status_string_round_trip() {
    for status in [
        AdmissionStatus::Draft,
        AdmissionStatus::Published,
        AdmissionStatus::Archived,
    ] {
        assert_eq!(AdmissionStatus::from_str(status.as_str()), Ok(status));
    }
    let err = AdmissionStatus::from_str("deleted").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_status_defaults_to_draft() {
    assert_eq!(AdmissionStatus::default(), AdmissionStatus::Draft);
}
