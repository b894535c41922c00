//! Shared helpers for server integration tests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use bouquet_core::FlowerCatalog;
use bouquet_export::{BouquetExporter, ExportConfig};
use bouquet_server::{router, AppState, BouquetStore};
use serde_json::Value;
use tower::ServiceExt;

/// Body size limit for test responses.
const MAX_BODY: usize = 16 * 1024 * 1024;

/// Router over `store` with the built-in catalog and a font-less exporter.
pub fn app(store: BouquetStore) -> Router {
    let exporter = BouquetExporter::new(ExportConfig {
        scale: 1.0,
        system_fonts: false,
        ..ExportConfig::default()
    });
    router(AppState::new(store, FlowerCatalog::builtin(), exporter))
}

/// A six-flower composition in the request shape.
pub fn composition_json(mode: &str, message: &str) -> Value {
    serde_json::json!({
        "mode": mode,
        "flowers": [{"id": 1, "count": 3}, {"id": 8, "count": 3}],
        "flower_order": [5, 4, 3, 2, 1, 0],
        "greenery": 1,
        "letter": {"recipient": "Mona", "sender": "Sami", "message": message},
        "created_at": 1_700_000_000_000_u64,
        "arrangement_seed": 7
    })
}

/// Send a request and return status, headers and raw body.
pub async fn send(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), MAX_BODY).await.expect("body");
    (status, headers, bytes.to_vec())
}

/// GET `uri` and parse the JSON body.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).expect("json body"))
}

/// POST `body` as JSON to `uri` and parse the JSON response.
pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).expect("json body"))
}

/// Share a bouquet and return its id.
pub async fn share(app: &Router, mode: &str, lang: &str, message: &str) -> String {
    let body = serde_json::json!({
        "composition": composition_json(mode, message),
        "lang": lang,
    });
    let (status, created) = post_json(app, "/api/bouquets", &body).await;
    assert_eq!(status, StatusCode::CREATED, "share failed: {created}");
    created["id"].as_str().expect("id").to_string()
}
