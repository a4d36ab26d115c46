//! Router fixtures for API tests.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use splitledger_api::{AppState, create_router};
use splitledger_core::storage::{ReceiptStorage, StorageConfig, StorageProvider};
use splitledger_db::Migrator;
use tower::ServiceExt;

pub const BOUNDARY: &str = "splitledger-test-boundary";

/// Router over a fresh in-memory database, without receipt storage.
pub async fn app() -> Router {
    app_with_storage(None).await
}

/// Router over a fresh in-memory database with receipts stored under `dir`.
pub async fn app_with_receipts(dir: &std::path::Path, max_file_size: u64) -> Router {
    let config = StorageConfig::new(StorageProvider::local_fs(dir)).with_max_file_size(max_file_size);
    let storage = ReceiptStorage::from_config(config).unwrap();
    app_with_storage(Some(storage)).await
}

async fn app_with_storage(storage: Option<ReceiptStorage>) -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    create_router(AppState::new(db, storage))
}

/// Sends a request with an optional JSON body and returns status and JSON.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    into_json(app, request).await
}

pub async fn into_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = raw(app, request).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn raw(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

/// Builds a multipart request carrying one file part.
pub fn multipart_upload(uri: &str, field: &str, filename: &str, mime: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Creates a user and returns its id.
pub async fn create_user(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(serde_json::json!({ "name": name, "email": format!("{}@example.com", name.to_lowercase()) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Creates a group with the named members, joined in order.
pub async fn group_with_members(app: &Router, names: &[&str]) -> (String, Vec<String>) {
    let (status, group) = send(
        app,
        Method::POST,
        "/groups",
        Some(serde_json::json!({ "name": "Trip" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = group["id"].as_str().unwrap().to_string();

    let mut users = Vec::new();
    for name in names {
        let user_id = create_user(app, name).await;
        let (status, _) = send(
            app,
            Method::POST,
            &format!("/groups/{group_id}/members"),
            Some(serde_json::json!({ "user_id": user_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        users.push(user_id);
    }
    (group_id, users)
}
