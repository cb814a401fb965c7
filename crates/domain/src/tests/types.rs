// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use super::create_medical_school;
use crate::{
    AdmissionSchedule, AdmissionStatus, Entity, ErrorKind, Record, ScheduleName, Subject,
    TestTypeName, University,
};

#[test]
fn test_schedule_names_serialise_in_japanese() {
    assert_eq!(
        serde_json::to_value(ScheduleName::Middle).unwrap(),
        serde_json::json!("中期")
    );
    let parsed: ScheduleName = serde_json::from_value(serde_json::json!("late")).unwrap();
    assert_eq!(parsed, ScheduleName::Late);
    assert_eq!(ScheduleName::from_str("前期"), Ok(ScheduleName::Early));
    assert_eq!(
        ScheduleName::from_str("夏期").unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
}

#[test]
fn test_schedule_order_follows_round() {
    assert_eq!(AdmissionSchedule::new(ScheduleName::Early).display_order, 1);
    assert_eq!(AdmissionSchedule::new(ScheduleName::Middle).display_order, 2);
    assert_eq!(AdmissionSchedule::new(ScheduleName::Late).display_order, 3);
}

#[test]
fn test_test_type_names() {
    assert_eq!(TestTypeName::Common.as_str(), "共通");
    assert_eq!(TestTypeName::from_str("secondary"), Ok(TestTypeName::Secondary));
}

#[test]
fn test_entity_tables() {
    assert_eq!(University::TABLE, "universities");
    assert_eq!(Subject::TABLE, "subjects");
    assert_eq!(AdmissionSchedule::KIND, "AdmissionSchedule");
}

#[test]
fn test_record_is_flattened_in_json() {
    let mut university: University = create_medical_school();
    university.record = Record::persisted(7, 3);

    let json: serde_json::Value = serde_json::to_value(&university).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["version"], 3);
    assert_eq!(json["name"], "津々大学");
    assert!(json["deleted_at"].is_null());
    assert_eq!(
        json["departments"][0]["majors"][0]["admission_schedules"][0]["name"],
        "前期"
    );
    assert_eq!(
        json["departments"][0]["majors"][0]["admission_schedules"][0]["admission_infos"][0]["status"],
        "draft"
    );
    assert_eq!(university.id(), Some(7));
}

#[test]
fn test_minimal_body_deserialises_with_defaults() {
    let body: serde_json::Value = serde_json::json!({
        "name": "新大学",
        "departments": [{
            "name": "理学部",
            "majors": [{
                "name": "数学科",
                "admission_schedules": [{
                    "name": "後期",
                    "admission_infos": [{
                        "academic_year": 2027,
                        "valid_from": "2027-04-01T00:00:00Z",
                        "valid_until": "2028-03-31T00:00:00Z",
                        "enrollment": 20
                    }],
                    "test_types": [{
                        "name": "二次",
                        "subjects": [{"name": "数学", "score": 400, "display_order": 1}]
                    }]
                }]
            }]
        }]
    });

    let university: University = serde_json::from_value(body).unwrap();
    assert_eq!(university.id(), None);
    assert_eq!(university.record.version, 0);

    let schedule = &university.departments[0].majors[0].admission_schedules[0];
    assert_eq!(schedule.name, ScheduleName::Late);
    // omitted display order is derived later from the round name
    assert_eq!(schedule.display_order, 0);
    assert_eq!(schedule.admission_infos[0].status, AdmissionStatus::Draft);
    assert!(schedule.test_types[0].subjects[0].percentage.abs() < f64::EPSILON);
}
