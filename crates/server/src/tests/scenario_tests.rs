// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end catalog workflows over HTTP.

use axum::{Router, http::StatusCode};
use serde_json::{Value, json};

use super::{TreeIds, create_test_app, create_university, get_json, send};

const MEDICAL_SUBJECTS: [(&str, i32); 6] = [
    ("英語L", 50),
    ("英語R", 50),
    ("数学", 100),
    ("国語", 100),
    ("理科", 200),
    ("地歴公", 50),
];

fn percentages(test_type: &Value) -> Vec<f64> {
    test_type["subjects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["percentage"].as_f64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_seeding_medical_school_computes_percentages() {
    let app: Router = create_test_app();
    let created: Value = create_university(&app, "津々大学", &MEDICAL_SUBJECTS).await;

    let test_type: &Value =
        &created["departments"][0]["majors"][0]["admission_schedules"][0]["test_types"][0];
    let actual: Vec<f64> = percentages(test_type);
    for ((_, score), percentage) in MEDICAL_SUBJECTS.iter().zip(&actual) {
        let expected: f64 = f64::from(*score) * 100.0 / 550.0;
        assert!((percentage - expected).abs() < 0.01, "{percentage} != {expected}");
    }
    let total: f64 = actual.iter().sum();
    assert!((total - 100.0).abs() < 1e-4, "sum was {total}");

    let ids: TreeIds = TreeIds::from_university(&created);
    let (status, fetched) = get_json(&app, &format!("/api/universities/{}", ids.university)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_concurrent_updates_with_same_version_admit_one() {
    let app: Router = create_test_app();
    let created: Value = create_university(&app, "津々大学", &MEDICAL_SUBJECTS).await;
    let uri: String = format!("/api/universities/{}", created["id"]);
    let (_, current) = get_json(&app, &uri).await;
    let version: i64 = current["version"].as_i64().unwrap();

    let first: Value = json!({ "name": "津々医科大学", "version": version });
    let second: Value = json!({ "name": "津々総合大学", "version": version });
    let ((status_a, body_a), (status_b, body_b)) = tokio::join!(
        send(&app, "PUT", &uri, Some(&first)),
        send(&app, "PUT", &uri, Some(&second)),
    );

    let mut statuses: Vec<StatusCode> = vec![status_a, status_b];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::BAD_REQUEST]);
    let (winner, loser) = if status_a == StatusCode::OK {
        (body_a, body_b)
    } else {
        (body_b, body_a)
    };
    assert_eq!(winner["version"], version + 1);
    assert_eq!(loser["code"], "VALIDATION_ERROR");
    assert_eq!(loser["details"]["violations"][0]["rule"], "stale_version");
}

#[tokio::test]
async fn test_batch_replace_subjects() {
    let app: Router = create_test_app();
    let created: Value = create_university(&app, "津々大学", &[("A", 100), ("B", 100)]).await;
    let ids: TreeIds = TreeIds::from_university(&created);

    let body: Value = json!({
        "test_type_id": ids.test_type,
        "subjects": [
            { "name": "A", "score": 300 },
            { "name": "C", "score": 100 },
        ],
    });
    let (status, test_type) = send(
        &app,
        "PUT",
        &format!("{}/subjects/batch", ids.department_uri()),
        Some(&body),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{test_type}");

    let subjects: &Vec<Value> = test_type["subjects"].as_array().unwrap();
    let names: Vec<&str> = subjects.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["A", "C"]);
    assert_eq!(percentages(&test_type), vec![75.0, 25.0]);
    assert_eq!(subjects[0]["id"], ids.subjects[0]);

    let (status, _) = get_json(&app, &ids.subject_uri(1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cascade_delete_hides_descendants() {
    let app: Router = create_test_app();
    let created: Value = create_university(&app, "津々大学", &MEDICAL_SUBJECTS).await;
    let ids: TreeIds = TreeIds::from_university(&created);
    let university_uri: String = format!("/api/universities/{}", ids.university);

    let (status, body) = send(&app, "DELETE", &university_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    for uri in [
        university_uri.clone(),
        ids.department_uri(),
        ids.major_uri(),
        ids.schedule_uri(),
        ids.subject_uri(0),
    ] {
        let (status, body) = get_json(&app, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["code"], "NOT_FOUND");
    }
    let (_, all) = get_json(&app, "/api/universities").await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_search_input_policy() {
    let app: Router = create_test_app();
    create_university(&app, "津々大学", &MEDICAL_SUBJECTS).await;

    let too_long: String = "a".repeat(101);
    let cases: [(String, &str); 4] = [
        (String::from("/api/universities/search?q="), "検索クエリは必須です"),
        (String::from("/api/universities/search"), "検索クエリは必須です"),
        (
            format!("/api/universities/search?q={too_long}"),
            "検索クエリは100文字以内で入力してください",
        ),
        (
            String::from("/api/universities/search?q=test;"),
            "検索クエリに不正な文字が含まれています",
        ),
    ];
    for (uri, message) in cases {
        let (status, body) = get_json(&app, &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "INVALID_INPUT");
        assert_eq!(body["message"], message);
    }

    let (status, body) = get_json(&app, "/api/universities/search?q=%25").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "検索クエリに不正な文字が含まれています");
}

#[tokio::test]
async fn test_search_returns_data_and_meta() {
    let app: Router = create_test_app();
    create_university(&app, "津々大学", &MEDICAL_SUBJECTS).await;

    // 医学科
    let (status, body) =
        get_json(&app, "/api/universities/search?q=%E5%8C%BB%E5%AD%A6%E7%A7%91").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["query"], "医学科");
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["name"], "津々大学");
    assert!(body["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_academic_year_boundary() {
    let app: Router = create_test_app();
    let created: Value = create_university(&app, "津々大学", &MEDICAL_SUBJECTS).await;
    let ids: TreeIds = TreeIds::from_university(&created);
    let uri: String = format!("{}/admission-infos", ids.schedule_uri());

    let info = |year: i32| {
        json!({
            "academic_year": year,
            "valid_from": "2026-04-01T00:00:00Z",
            "valid_until": "2027-04-01T00:00:00Z",
            "enrollment": 100,
        })
    };

    let (status, body) = send(&app, "POST", &uri, Some(&info(1999))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_YEAR");

    let (status, body) = send(&app, "POST", &uri, Some(&info(2000))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["academic_year"], 2000);
    assert_eq!(body["status"], "draft");

    let info_uri: String = format!("{uri}/{}", body["id"]);
    let (status, fetched) = get_json(&app, &info_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);
}
