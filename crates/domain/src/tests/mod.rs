// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod admission_status;
mod error;
mod scoring;
mod types;

use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AdmissionInfo, AdmissionSchedule, Department, Major, ScheduleName, Subject, TestType,
    TestTypeName, University, recompute_all,
};

pub fn window_start() -> OffsetDateTime {
    datetime!(2026-04-01 00:00 UTC)
}

/// A valid admission info spanning exactly 365 days.
pub fn create_test_admission_info(academic_year: i32) -> AdmissionInfo {
    AdmissionInfo::new(
        academic_year,
        window_start(),
        window_start() + time::Duration::days(365),
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

/// 津々大学 → 医学部 → 医学科 → 前期 → 共通 with six subjects, percentages computed.
pub fn create_medical_school() -> University {
    let mut university: University = University::new("津々大学").with_department(
        Department::new("医学部").with_major(
            Major::new("医学科").with_schedule(
                AdmissionSchedule::new(ScheduleName::Early)
                    .with_admission_info(create_test_admission_info(2026))
                    .with_test_type(
                        TestType::new(TestTypeName::Common)
                            .with_subjects(create_medical_subjects()),
                    ),
            ),
        ),
    );
    recompute_all(&mut university);
    university
}
