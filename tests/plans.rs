use axum::{body::to_bytes, http::Request, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;
use trackmetrics_rs::matcher;
use trackmetrics_rs::types::activity::{ActivityType, TrainingEntry};
use trackmetrics_rs::{routes, state::AppState};
use uuid::Uuid;

fn app() -> Router {
    let state = AppState::new();
    Router::new()
        .merge(routes::health::router())
        .merge(routes::upload::router())
        .merge(routes::activities::router())
        .merge(routes::plans::router())
        .with_state(state)
}

fn sample_gpx() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><name>Morning Run</name><trkseg>
    <trkpt lat="52.0000" lon="13.0000"><ele>34.0</ele><time>2026-01-01T12:00:00Z</time></trkpt>
    <trkpt lat="52.0009" lon="13.0000"><ele>39.0</ele><time>2026-01-01T12:01:00Z</time></trkpt>
  </trkseg></trk>
</gpx>"#
}

fn multipart_body(file_name: &str, file_body: &str, boundary: &str) -> String {
    format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{file_body}\r\n--{boundary}--\r\n"
    )
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn create_entry(app: &Router, date: &str, title: &str) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/plans")
                .method("POST")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({"date": date, "title": title, "activity_type": "running"}).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    json_body(response).await
}

async fn upload_sample(app: &Router) -> Value {
    let boundary = "X-BOUNDARY-TEST";
    let body = multipart_body("run.gpx", sample_gpx(), boundary);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/upload")
                .method("POST")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(axum::body::Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    json_body(response).await
}

async fn confirm(app: &Router, activity_id: &str, entry_id: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/activities/{activity_id}/match/{entry_id}"))
                .method("POST")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response")
}

#[tokio::test]
async fn create_and_list_entries_by_day() {
    let app = app();
    create_entry(&app, "2026-01-01", "Easy run").await;
    create_entry(&app, "2026-01-02", "Long run").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/plans?date=2026-01-01")
                .method("GET")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let json = json_body(response).await;
    let entries = json.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Easy run");
    assert_eq!(entries[0]["completed"], false);
}

#[tokio::test]
async fn upload_surfaces_same_day_incomplete_entries_as_candidates() {
    let app = app();
    create_entry(&app, "2026-01-01", "Easy run").await;
    create_entry(&app, "2026-01-05", "Other day").await;

    let upload = upload_sample(&app).await;
    let candidates = upload["match_candidates"].as_array().expect("array");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["title"], "Easy run");
}

#[tokio::test]
async fn confirm_match_links_activity_and_completes_entry() {
    let app = app();
    let entry = create_entry(&app, "2026-01-01", "Easy run").await;
    let upload = upload_sample(&app).await;

    let activity_id = upload["activity_id"].as_str().expect("activity id");
    let entry_id = entry["id"].as_str().expect("entry id");

    let response = confirm(&app, activity_id, entry_id).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["entry"]["completed"], true);
    assert_eq!(json["entry"]["activity_id"], activity_id);
    assert_eq!(json["activity"]["matched_entry"], entry_id);

    // Both writes are visible together afterwards.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/activities/{activity_id}"))
                .method("GET")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let json = json_body(response).await;
    assert_eq!(json["activity"]["matched_entry"], entry_id);

    // A completed entry cannot be matched again.
    let response = confirm(&app, activity_id, entry_id).await;
    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn confirm_match_rejects_unknown_ids_and_wrong_day() {
    let app = app();
    let entry = create_entry(&app, "2026-02-15", "Wrong day").await;
    let upload = upload_sample(&app).await;

    let activity_id = upload["activity_id"].as_str().expect("activity id");
    let entry_id = entry["id"].as_str().expect("entry id");

    let response = confirm(&app, activity_id, &Uuid::new_v4().to_string()).await;
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);

    let response = confirm(&app, &Uuid::new_v4().to_string(), entry_id).await;
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);

    let response = confirm(&app, activity_id, entry_id).await;
    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
}

#[test]
fn same_day_candidates_filters_day_and_completion() {
    let day = NaiveDate::from_ymd_opt(2026, 1, 1).expect("date");
    let other = NaiveDate::from_ymd_opt(2026, 1, 2).expect("date");
    let entry = |date, title: &str, completed| TrainingEntry {
        id: Uuid::new_v4(),
        date,
        title: title.to_string(),
        activity_type: ActivityType::Running,
        completed,
        activity_id: None,
    };

    let entries = vec![
        entry(day, "B planned", false),
        entry(day, "A planned", false),
        entry(day, "Done already", true),
        entry(other, "Tomorrow", false),
    ];

    let start = "2026-01-01T23:59:59Z".parse().expect("timestamp");
    let candidates = matcher::same_day_candidates(start, entries);

    assert_eq!(candidates.len(), 2);
    // Sorted by title for a stable presentation order.
    assert_eq!(candidates[0].title, "A planned");
    assert_eq!(candidates[1].title, "B planned");
}
