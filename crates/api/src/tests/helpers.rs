// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, Department, Entity, Major, ScheduleName, Subject, TestType,
    TestTypeName, University,
};
use nyushi_persistence::{Deadline, Persistence};
use time::macros::datetime;

use crate::{
    AdmissionInfoPathParams, DepartmentPathParams, MajorPathParams, SchedulePathParams,
    SubjectPathParams, create_university,
};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn deadline() -> Deadline {
    Deadline::default_request()
}

pub fn create_test_admission_info(academic_year: i32) -> AdmissionInfo {
    let from = datetime!(2026-04-01 00:00 UTC);
    AdmissionInfo::new(academic_year, from, from + time::Duration::days(365), 100)
}

pub fn create_test_university(name: &str) -> University {
    University::new(name).with_department(
        Department::new("医学部").with_major(
            Major::new("医学科").with_schedule(
                AdmissionSchedule::new(ScheduleName::Early)
                    .with_admission_info(create_test_admission_info(2026))
                    .with_test_type(TestType::new(TestTypeName::Common).with_subjects(vec![
                        Subject::new("英語", 200).ordered(1),
                        Subject::new("数学", 200).ordered(2),
                        Subject::new("国語", 100).ordered(3),
                    ])),
            ),
        ),
    )
}

/// Identifiers along the single path of a seeded university, as raw path
/// segments.
#[derive(Debug, Clone)]
pub struct SeededPath {
    pub university: String,
    pub department: String,
    pub major: String,
    pub schedule: String,
    pub admission_info: String,
    pub test_type: i64,
    pub subjects: Vec<String>,
}

impl SeededPath {
    pub fn department(&self) -> DepartmentPathParams {
        DepartmentPathParams {
            university_id: self.university.clone(),
            department_id: self.department.clone(),
        }
    }

    pub fn major(&self) -> MajorPathParams {
        MajorPathParams {
            university_id: self.university.clone(),
            department_id: self.department.clone(),
            major_id: self.major.clone(),
        }
    }

    pub fn schedule(&self) -> SchedulePathParams {
        SchedulePathParams {
            university_id: self.university.clone(),
            department_id: self.department.clone(),
            major_id: self.major.clone(),
            schedule_id: self.schedule.clone(),
        }
    }

    pub fn admission_info(&self) -> AdmissionInfoPathParams {
        AdmissionInfoPathParams {
            university_id: self.university.clone(),
            department_id: self.department.clone(),
            major_id: self.major.clone(),
            schedule_id: self.schedule.clone(),
            info_id: self.admission_info.clone(),
        }
    }

    pub fn subject(&self, index: usize) -> SubjectPathParams {
        SubjectPathParams {
            university_id: self.university.clone(),
            department_id: self.department.clone(),
            subject_id: self.subjects[index].clone(),
        }
    }
}

fn raw_id<E: Entity>(entity: &E) -> String {
    entity.id().unwrap().to_string()
}

/// Creates a university through the handler and returns it with its path.
pub fn seed_university(persistence: &Persistence, name: &str) -> (University, SeededPath) {
    let created: University =
        create_university(persistence, &create_test_university(name), &deadline()).unwrap();
    let department: &Department = &created.departments[0];
    let major: &Major = &department.majors[0];
    let schedule: &AdmissionSchedule = &major.admission_schedules[0];
    let test_type: &TestType = &schedule.test_types[0];
    let path: SeededPath = SeededPath {
        university: raw_id(&created),
        department: raw_id(department),
        major: raw_id(major),
        schedule: raw_id(schedule),
        admission_info: raw_id(&schedule.admission_infos[0]),
        test_type: test_type.id().unwrap(),
        subjects: test_type.subjects.iter().map(raw_id).collect(),
    };
    (created, path)
}
