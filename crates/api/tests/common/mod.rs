#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use calc_api::config::ServerConfig;
use calc_api::router::build_app_router;
use calc_api::state::AppState;
use calc_core::OperationTimes;

/// Build a test `ServerConfig` with safe defaults and instant operations.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        operation_times: OperationTimes::zero(),
    }
}

/// Build the full application router with a fresh orchestrator.
///
/// Uses the same builder as `main.rs`, so tests exercise the production
/// middleware stack.
pub fn build_test_app() -> Router {
    let config = test_config();
    build_app_router(AppState::new(config.clone()), &config)
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<String>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit an expression and return its id, asserting 201.
pub async fn submit(app: &Router, expression: &str) -> String {
    let response = post_json(
        app.clone(),
        "/api/v1/calculate",
        serde_json::json!({ "expression": expression }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"]
        .as_str()
        .expect("id should be a string")
        .to_string()
}

/// Claim the next task, asserting one is available.
pub async fn claim_task(app: &Router) -> Value {
    let response = get(app.clone(), "/internal/task").await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["task"].clone()
}

pub async fn fetch_expression(app: &Router, id: &str) -> Value {
    let response = get(app.clone(), &format!("/api/v1/expressions/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["expression"].clone()
}
