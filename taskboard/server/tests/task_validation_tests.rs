use axum::http::StatusCode;
use insta::assert_yaml_snapshot;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
use serde_json::json;
use std::sync::Arc;
use taskboard_server::task::api::v1::{TaskState, create_api_router};

mod common;

use common::{HttpResponseSnapshot, send};

/// Router backed by a disconnected pool: any store access would fail the test.
fn app_without_store() -> axum::Router {
    let _ = tracing_subscriber::fmt().try_init();
    create_api_router(Arc::new(TaskState {
        db: Arc::new(DatabaseConnection::Disconnected),
    }))
}

/// Router backed by a mock pool whose first query fails.
fn app_with_failing_store() -> axum::Router {
    let _ = tracing_subscriber::fmt().try_init();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom(
            "connection to 10.0.0.12 refused".to_string(),
        )])
        .into_connection();
    create_api_router(Arc::new(TaskState { db: Arc::new(db) }))
}

#[tokio::test]
async fn can_reject_blank_title() {
    let app = app_without_store();

    let (status, headers, body) = send(&app, "POST", "/tasks", Some(json!({ "title": "" }))).await;

    let snapshot_data = HttpResponseSnapshot::new(body, status, &headers, "blank_title");
    assert_yaml_snapshot!(snapshot_data);
}

#[tokio::test]
async fn can_reject_whitespace_title() {
    let app = app_without_store();

    let (status, _, body) = send(
        &app,
        "POST",
        "/tasks",
        Some(json!({ "title": "   ", "description": "d" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title is required");
}

#[tokio::test]
async fn can_reject_missing_title() {
    let app = app_without_store();

    let (status, _, body) = send(&app, "POST", "/tasks", Some(json!({ "description": "d" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn can_reject_malformed_json() {
    let app = app_without_store();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/tasks")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"title\": "))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn can_reject_blank_title_on_update() {
    let app = app_without_store();

    let (status, _, body) = send(&app, "PUT", "/tasks/1", Some(json!({ "title": "" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title is required");
}

#[tokio::test]
async fn can_reject_unknown_status_code() {
    let app = app_without_store();

    let (status, _, body) =
        send(&app, "PATCH", "/tasks/1/status", Some(json!({ "status_id": 7 }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn can_reject_unknown_field() {
    let app = app_without_store();

    let (status, _, body) = send(
        &app,
        "POST",
        "/tasks",
        Some(json!({ "title": "x", "bogus": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn can_reject_non_numeric_task_id() {
    let app = app_without_store();

    let (status, headers, body) = send(&app, "DELETE", "/tasks/abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn treats_out_of_range_task_id_as_missing() {
    let app = app_without_store();

    let (get_status, _, _) = send(&app, "GET", "/tasks/3000000000", None).await;
    let (delete_status, _, _) = send(&app, "DELETE", "/tasks/3000000000", None).await;
    let (hold_status, _, _) = send(
        &app,
        "PATCH",
        "/tasks/3000000000/status",
        Some(json!({ "status_id": 2 })),
    )
    .await;

    assert_eq!(get_status, StatusCode::NOT_FOUND);
    assert_eq!(delete_status, StatusCode::NOT_FOUND);
    assert_eq!(hold_status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn can_reject_malformed_list_parameters() {
    let app = app_without_store();

    let (status, _, body) = send(&app, "GET", "/tasks?limit=many", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn can_hide_store_failure_details() {
    let app = app_with_failing_store();

    let (status, headers, body) = send(&app, "GET", "/tasks?search=Test", None).await;

    let snapshot_data = HttpResponseSnapshot::new(body, status, &headers, "store_failure");
    assert_yaml_snapshot!(snapshot_data);
}
