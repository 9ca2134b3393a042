#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use flipwatch_server::{api::app_router, build_state, config::Config};

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        db_path: dir.path().join("test.db").to_string_lossy().into_owned(),
        public_url: "https://flipwatch.test".to_string(),
        ..Config::default()
    }
}

pub async fn test_app(config: &Config) -> Router {
    let state = build_state(config).await.unwrap();
    app_router(state, config)
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
