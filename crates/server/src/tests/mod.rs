// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Router and configuration tests.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod config_tests;
mod scenario_tests;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use nyushi_persistence::Persistence;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Timeouts;
use crate::routes::{AppState, build_router};

/// Router over a fresh in-memory database.
pub fn create_test_app() -> Router {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    build_router(AppState::new(persistence, Timeouts::default()))
}

/// Sends one request and returns the status and the decoded JSON body
/// (`Value::Null` for an empty body).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body: Body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(json).unwrap())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

/// Identifiers along the first path of a created university.
#[derive(Debug, Clone)]
pub struct TreeIds {
    pub university: i64,
    pub department: i64,
    pub major: i64,
    pub schedule: i64,
    pub test_type: i64,
    pub subjects: Vec<i64>,
}

impl TreeIds {
    pub fn from_university(university: &Value) -> Self {
        let department: &Value = &university["departments"][0];
        let major: &Value = &department["majors"][0];
        let schedule: &Value = &major["admission_schedules"][0];
        let test_type: &Value = &schedule["test_types"][0];
        Self {
            university: university["id"].as_i64().unwrap(),
            department: department["id"].as_i64().unwrap(),
            major: major["id"].as_i64().unwrap(),
            schedule: schedule["id"].as_i64().unwrap(),
            test_type: test_type["id"].as_i64().unwrap(),
            subjects: test_type["subjects"]
                .as_array()
                .unwrap()
                .iter()
                .map(|s| s["id"].as_i64().unwrap())
                .collect(),
        }
    }

    pub fn department_uri(&self) -> String {
        format!(
            "/api/universities/{}/departments/{}",
            self.university, self.department
        )
    }

    pub fn major_uri(&self) -> String {
        format!("{}/majors/{}", self.department_uri(), self.major)
    }

    pub fn schedule_uri(&self) -> String {
        format!("{}/schedules/{}", self.major_uri(), self.schedule)
    }

    pub fn subject_uri(&self, index: usize) -> String {
        format!("{}/subjects/{}", self.department_uri(), self.subjects[index])
    }
}

/// Posts a university whose only test type carries `subjects` as
/// `(name, score)` pairs.
pub async fn create_university(app: &Router, name: &str, subjects: &[(&str, i32)]) -> Value {
    let subjects: Vec<Value> = subjects
        .iter()
        .map(|(name, score)| serde_json::json!({ "name": name, "score": score }))
        .collect();
    let body: Value = serde_json::json!({
        "name": name,
        "departments": [{
            "name": "医学部",
            "majors": [{
                "name": "医学科",
                "admission_schedules": [{
                    "name": "前期",
                    "test_types": [{ "name": "共通", "subjects": subjects }],
                }],
            }],
        }],
    });
    let (status, created) = send(app, "POST", "/api/universities", Some(&body)).await;
    assert_eq!(status, StatusCode::OK, "{created}");
    created
}
