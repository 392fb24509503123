#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@pets.local";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub upload_dir: PathBuf,
}

pub fn test_config(upload_dir: &PathBuf) -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "test-secret".into();
    config.auth.token_ttl_hours = 24;
    config.auth.hash_memory_kib = 1024;
    config.auth.hash_iterations = 1;
    config.uploads.dir = upload_dir.to_string_lossy().into_owned();
    config.uploads.max_files = 5;
    config.seed.enabled = true;
    config
}

/// Router over a fresh in-memory database with the seeded admin and user accounts.
pub async fn spawn_app() -> anyhow::Result<TestApp> {
    let db = models::db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    let upload_dir = std::env::temp_dir().join(format!("lost-pets-test-{}", Uuid::new_v4()));
    let router = server::startup::build_app(&test_config(&upload_dir), db.clone()).await?;
    Ok(TestApp { router, db, upload_dir })
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

pub async fn send(app: &TestApp, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp = app.router.clone().call(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok((status, value))
}

/// Register a fresh account; returns (token, user id).
pub async fn register(app: &TestApp, email: &str) -> anyhow::Result<(String, String)> {
    let (status, body) = send(
        app,
        json_request("POST", "/auth/register", None, Some(json!({"email": email, "password": "secret1"}))),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let token = body["token"].as_str().unwrap().to_string();
    let id = body["user"]["id"].as_str().unwrap().to_string();
    Ok((token, id))
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> anyhow::Result<String> {
    let (status, body) = send(
        app,
        json_request("POST", "/auth/login", None, Some(json!({"email": email, "password": password}))),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    Ok(body["token"].as_str().unwrap().to_string())
}

pub fn lost_cat() -> Value {
    json!({
        "title": "Lost cat",
        "description": "Grey tabby, answers to Tom",
        "animalType": "cat",
        "location": "Springfield",
        "dateLost": "2024-01-01",
        "contactPhone": "5551234567"
    })
}

pub async fn create_listing(app: &TestApp, token: &str, body: Value) -> anyhow::Result<Value> {
    let (status, created) = send(app, json_request("POST", "/api/listings", Some(token), Some(body))).await?;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    Ok(created)
}
