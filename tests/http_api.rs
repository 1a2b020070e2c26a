//! HTTP routing, status codes, and response envelopes.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pr_reviewer_lib::db::{self, DbPool};
use pr_reviewer_lib::services::{build_router, AppState};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

async fn create_test_app() -> (TempDir, Router) {
    let (dir, _pool, app) = create_test_app_with_timeout(Duration::from_secs(5)).await;
    (dir, app)
}

async fn create_test_app_with_timeout(timeout: Duration) -> (TempDir, DbPool, Router) {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::initialize(&dir.path().join("api.db")).await.unwrap();
    let app = build_router(AppState { db: pool.clone() }, timeout);
    (dir, pool, app)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn add_core_team(app: &Router) {
    let (status, _) = post(
        app,
        "/team/add",
        json!({
            "team_name": "core",
            "members": [
                {"user_id": "u1", "username": "Alice", "is_active": true},
                {"user_id": "u2", "username": "Bob", "is_active": true},
                {"user_id": "u3", "username": "Carol", "is_active": true},
                {"user_id": "u4", "username": "Dave", "is_active": true}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = create_test_app().await;
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_team_endpoints() {
    let (_dir, app) = create_test_app().await;

    let (status, body) = post(
        &app,
        "/team/add",
        json!({
            "team_name": "core",
            "members": [
                {"user_id": "u2", "username": "Bob", "is_active": false},
                {"user_id": "u1", "username": "Alice", "is_active": true}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["team"]["team_name"], "core");
    assert_eq!(body["team"]["members"][0]["user_id"], "u1");
    assert_eq!(body["team"]["members"][1]["is_active"], false);

    let (status, body) = get(&app, "/team/get?team_name=core").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_name"], "core");
    assert_eq!(body["members"].as_array().unwrap().len(), 2);

    let (status, body) = post(
        &app,
        "/team/add",
        json!({"team_name": "core", "members": [{"user_id": "u9", "username": "Zed", "is_active": true}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TEAM_EXISTS");

    let (status, body) = get(&app, "/team/get?team_name=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_team_validation() {
    let (_dir, app) = create_test_app().await;

    let (status, body) = post(&app, "/team/add", json!({"team_name": "core", "members": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let (status, body) = post(
        &app,
        "/team/add",
        json!({"team_name": "", "members": [{"user_id": "u1", "username": "A", "is_active": true}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let (status, body) = get(&app, "/team/get").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_malformed_json() {
    let (_dir, app) = create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/pullRequest/create")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_pull_request_lifecycle() {
    let (_dir, app) = create_test_app().await;
    add_core_team(&app).await;

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr1", "pull_request_name": "feat", "author_id": "u1"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pr"]["status"], "OPEN");
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["u2", "u3"]));
    assert!(body["pr"]["createdAt"].is_string());
    assert!(body["pr"].get("mergedAt").is_none());

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr1", "pull_request_name": "feat", "author_id": "u1"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PR_EXISTS");

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr1", "old_user_id": "u2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced_by"], "u4");
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["u4", "u3"]));

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr1", "old_user_id": "u2"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NOT_ASSIGNED");

    // With u2 inactive nobody but the author is left for u3's slot
    let (status, _) = post(
        &app,
        "/users/setIsActive",
        json!({"user_id": "u2", "is_active": false}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr1", "old_user_id": "u3"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NO_CANDIDATE");

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "pr1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["status"], "MERGED");
    let merged_at = body["pr"]["mergedAt"].clone();
    assert!(merged_at.is_string());

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "pr1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["mergedAt"], merged_at);

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr1", "old_user_id": "u4"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PR_MERGED");
}

#[tokio::test]
async fn test_pull_request_not_found() {
    let (_dir, app) = create_test_app().await;
    add_core_team(&app).await;

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr1", "pull_request_name": "feat", "author_id": "ghost"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "nope", "old_user_id": "u2"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr2", "author_id": "u1"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_user_endpoints() {
    let (_dir, app) = create_test_app().await;
    add_core_team(&app).await;

    let (status, body) = post(
        &app,
        "/users/setIsActive",
        json!({"user_id": "u2", "is_active": false}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["user_id"], "u2");
    assert_eq!(body["user"]["team_name"], "core");
    assert_eq!(body["user"]["is_active"], false);

    let (status, body) = post(
        &app,
        "/users/setIsActive",
        json!({"user_id": "ghost", "is_active": true}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr1", "pull_request_name": "feat", "author_id": "u1"}),
    )
    .await;

    let (status, body) = get(&app, "/users/getReview?user_id=u3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u3");
    assert_eq!(
        body["pull_requests"],
        json!([{
            "pull_request_id": "pr1",
            "pull_request_name": "feat",
            "author_id": "u1",
            "status": "OPEN"
        }])
    );

    let (status, body) = get(&app, "/users/getReview?user_id=u2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pull_requests"], json!([]));

    let (status, body) = get(&app, "/users/getReview?user_id=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_stats() {
    let (_dir, app) = create_test_app().await;
    add_core_team(&app).await;

    post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr1", "pull_request_name": "feat", "author_id": "u1"}),
    )
    .await;
    post(&app, "/pullRequest/merge", json!({"pull_request_id": "pr1"})).await;

    let (status, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pr"], 1);
    assert_eq!(body["open_pr"], 0);
    assert_eq!(body["merged_pr"], 1);
    assert_eq!(
        body["reviewers"][0],
        json!({"user_id": "u2", "username": "Bob", "assignments": 1})
    );
    assert_eq!(body["reviewers"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_unknown_route() {
    let (_dir, app) = create_test_app().await;
    let (status, body) = get(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_wrong_method() {
    let (_dir, app) = create_test_app().await;

    let (status, body) = get(&app, "/pullRequest/create").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("/pullRequest/create"));

    let (status, body) = post(&app, "/stats", json!({})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_request_timeout() {
    let (_dir, pool, app) = create_test_app_with_timeout(Duration::from_millis(200)).await;
    add_core_team(&app).await;

    // Holding the write lock keeps the handler waiting past the deadline
    let tx = db::begin_write(&pool).await.unwrap();

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "pr1"})).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["error"]["code"], "TIMEOUT");
    assert_eq!(body["error"]["message"], "Request timed out");

    tx.rollback().await.unwrap();

    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}
