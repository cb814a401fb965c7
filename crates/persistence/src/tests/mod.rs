// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod admission_info_tests;
mod cache_tests;
mod subject_tests;

use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, Department, Entity, Major, Record, ScheduleName, Subject,
    TestType, TestTypeName, University, recompute_all,
};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{Deadline, Persistence, SchedulePath};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn deadline() -> Deadline {
    Deadline::default_request()
}

pub fn window_start() -> OffsetDateTime {
    datetime!(2026-04-01 00:00 UTC)
}

/// A valid admission info spanning `days` days from [`window_start`].
pub fn create_test_admission_info(academic_year: i32, days: i64) -> AdmissionInfo {
    AdmissionInfo::new(
        academic_year,
        window_start(),
        window_start() + time::Duration::days(days),
        100,
    )
}

pub fn create_medical_subjects() -> Vec<Subject> {
    vec![
        Subject::new("英語L", 50).ordered(1),
        Subject::new("英語R", 50).ordered(2),
        Subject::new("数学", 100).ordered(3),
        Subject::new("国語", 100).ordered(4),
        Subject::new("理科", 200).ordered(5),
        Subject::new("地歴公", 50).ordered(6),
    ]
}

pub fn create_medical_major() -> Major {
    Major::new("医学科").with_schedule(
        AdmissionSchedule::new(ScheduleName::Early)
            .with_admission_info(create_test_admission_info(2026, 365))
            .with_test_type(
                TestType::new(TestTypeName::Common).with_subjects(create_medical_subjects()),
            ),
    )
}

/// 津々大学 → 医学部 → 医学科 → 前期 → 共通 with six subjects, percentages computed.
pub fn create_medical_school() -> University {
    let mut university: University = University::new("津々大学")
        .with_department(Department::new("医学部").with_major(create_medical_major()));
    recompute_all(&mut university);
    university
}

/// Identifiers of the single path through a seeded medical school.
#[derive(Debug, Clone)]
pub struct SeededIds {
    pub university: i64,
    pub department: i64,
    pub major: i64,
    pub schedule: i64,
    pub admission_info: i64,
    pub test_type: i64,
    pub subjects: Vec<i64>,
}

impl SeededIds {
    pub fn schedule_path(&self) -> SchedulePath {
        SchedulePath {
            university_id: self.university,
            department_id: self.department,
            major_id: self.major,
            schedule_id: self.schedule,
        }
    }
}

pub fn seeded_ids(university: &University) -> SeededIds {
    let department: &Department = &university.departments[0];
    let major: &Major = &department.majors[0];
    let schedule: &AdmissionSchedule = &major.admission_schedules[0];
    let test_type: &TestType = &schedule.test_types[0];
    SeededIds {
        university: university.id().unwrap(),
        department: department.id().unwrap(),
        major: major.id().unwrap(),
        schedule: schedule.id().unwrap(),
        admission_info: schedule.admission_infos[0].id().unwrap(),
        test_type: test_type.id().unwrap(),
        subjects: test_type.subjects.iter().map(|s| s.id().unwrap()).collect(),
    }
}

/// Stores the medical school and returns it as persisted.
pub fn seed_medical_school(persistence: &Persistence) -> (University, SeededIds) {
    let created: University = persistence
        .create_university(&create_medical_school(), &deadline())
        .unwrap();
    let ids: SeededIds = seeded_ids(&created);
    (created, ids)
}

/// Clears bookkeeping fields and parent links so that a stored tree can be
/// compared with its input.
pub fn without_records(mut university: University) -> University {
    university.record = Record::default();
    for department in &mut university.departments {
        department.record = Record::default();
        department.university_id = None;
        for major in &mut department.majors {
            major.record = Record::default();
            major.department_id = None;
            for schedule in &mut major.admission_schedules {
                schedule.record = Record::default();
                schedule.major_id = None;
                for info in &mut schedule.admission_infos {
                    info.record = Record::default();
                    info.admission_schedule_id = None;
                }
                for test_type in &mut schedule.test_types {
                    test_type.record = Record::default();
                    test_type.admission_schedule_id = None;
                    for subject in &mut test_type.subjects {
                        subject.record = Record::default();
                        subject.test_type_id = None;
                    }
                }
            }
        }
    }
    university
}

pub fn percentage_sum(subjects: &[Subject]) -> f64 {
    subjects.iter().map(|s| s.percentage).sum()
}
