// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Transport-agnostic handler layer of the Nyushi admissions catalog.
//!
//! Handlers receive raw path segments, decoded bodies, and a request
//! [`Deadline`](nyushi_persistence::Deadline), call the repository, and
//! return either a catalog value or an [`ApiError`] carrying the HTTP status
//! and the `{code, message, details}` body. The server crate owns routing,
//! body decoding, and scheduling.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use error::{ApiError, ErrorDetails, ErrorResponse, status_for, translate_catalog_error};
pub use handlers::{
    ApiResult, batch_update_subjects, create_admission_info, create_department, create_major,
    create_subject, create_university, delete_admission_info, delete_department, delete_major,
    delete_subject, delete_university, get_admission_info, get_admission_schedule, get_department,
    get_major, get_subject, get_university, health, list_universities, search_universities,
    update_admission_info, update_admission_schedule, update_department, update_major,
    update_subject, update_university,
};
pub use request_response::{
    AdmissionInfoPathParams, DepartmentPath, DepartmentPathParams, MajorPath, MajorPathParams,
    SchedulePathParams, SearchMeta, SearchParams, SearchResponse, SubjectBatchRequest,
    SubjectPathParams,
};
