//! End-to-end tests of the bouquet API through the axum router.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use bouquet_server::BouquetStore;
use common::{app, composition_json, get_json, post_json, send, share};

#[tokio::test]
async fn test_shared_bouquet_is_viewable() {
    let app = app(BouquetStore::new());
    let id = share(&app, "color", "ar", "Eid Mubarak").await;

    let (status, view) = get_json(&app, &format!("/api/bouquets/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["id"], id.as_str());
    assert_eq!(view["lang"], "ar");
    assert_eq!(view["composition"]["mode"], "color");
    assert_eq!(view["composition"]["letter"]["message"], "Eid Mubarak");
    assert_eq!(view["layout"]["card"]["rtl"], true);
    assert_eq!(view["layout"]["flowers"].as_array().map(Vec::len), Some(6));
    assert_eq!(view["layout"]["bush_back"], "/color/bush/bush-2.png");
}

#[tokio::test]
async fn test_tagged_mode_without_lang_keeps_marker_language() {
    let app = app(BouquetStore::new());
    let body = serde_json::json!({ "composition": composition_json("mono&lang=ar", "hi") });
    let (status, created) = post_json(&app, "/api/bouquets", &body).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_str().expect("id");
    let (_, view) = get_json(&app, &format!("/api/bouquets/{id}")).await;
    assert_eq!(view["lang"], "ar");
    assert_eq!(view["composition"]["mode"], "mono");
}

#[tokio::test]
async fn test_explicit_lang_overrides_marker() {
    let app = app(BouquetStore::new());
    let id = share(&app, "mono&lang=ar", "en", "hello").await;
    let (_, view) = get_json(&app, &format!("/api/bouquets/{id}")).await;
    assert_eq!(view["lang"], "en");
    assert_eq!(view["layout"]["card"]["rtl"], false);
}

#[tokio::test]
async fn test_invalid_submissions_are_rejected() {
    let app = app(BouquetStore::new());

    let bad_mode = serde_json::json!({
        "composition": composition_json("Color Mode", "hi"),
        "lang": "en",
    });
    let (status, body) = post_json(&app, "/api/bouquets", &bad_mode).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("mode")));

    let long_letter = composition_json("color", &"x".repeat(2001));
    let (status, body) = post_json(
        &app,
        "/api/bouquets",
        &serde_json::json!({ "composition": long_letter, "lang": "en" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("message")));

    let mut bad_order = composition_json("color", "hi");
    bad_order["flower_order"] = serde_json::json!([0, 0, 1, 2, 3, 4]);
    let (status, _) = post_json(
        &app,
        "/api/bouquets",
        &serde_json::json!({ "composition": bad_order, "lang": "en" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, garden) = get_json(&app, "/api/garden").await;
    assert_eq!(garden.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_missing_and_malformed_ids() {
    let app = app(BouquetStore::new());

    let (status, body) = get_json(&app, "/api/bouquets/doesnotexist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());

    let (status, _) = get_json(&app, "/api/bouquets/not.an.id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::get("/api/bouquets/doesnotexist/image.png")
        .body(Body::empty())
        .expect("request");
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_garden_lists_newest_first() {
    let app = app(BouquetStore::new());
    let first = share(&app, "color", "en", "first").await;
    let second = share(&app, "mono", "ar", "second").await;
    let third = share(&app, "color", "ar", "third").await;

    let (status, garden) = get_json(&app, "/api/garden").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = garden
        .as_array()
        .expect("array")
        .iter()
        .map(|entry| entry["id"].as_str().expect("id").to_string())
        .collect();
    assert_eq!(ids, vec![third, second, first]);
    assert_eq!(garden[1]["composition"]["mode"], "mono");
    assert_eq!(garden[1]["lang"], "ar");
}

#[tokio::test]
async fn test_card_image_is_png() {
    let app = app(BouquetStore::new());
    let id = share(&app, "color", "en", "hello").await;

    let request = Request::get(format!("/api/bouquets/{id}/image.png"))
        .body(Body::empty())
        .expect("request");
    let (status, headers, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    assert_eq!(&body[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
}

#[tokio::test]
async fn test_catalog_lists_builtin_flowers() {
    let app = app(BouquetStore::new());
    let (status, catalog) = get_json(&app, "/api/catalog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog.as_array().map(Vec::len), Some(11));
}

#[tokio::test]
async fn test_health_probes() {
    let app = app(BouquetStore::new());

    let request = Request::get("/health/live").body(Body::empty()).expect("request");
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, health) = get_json(&app, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["checks"]["store"], true);
    assert_eq!(health["checks"]["catalog"], true);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = app(BouquetStore::new());
    let request = Request::get("/health/live")
        .header("x-request-id", "test-123")
        .body(Body::empty())
        .expect("request");
    let (_, headers, _) = send(&app, request).await;
    assert_eq!(
        headers.get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("test-123")
    );

    let request = Request::get("/health/live").body(Body::empty()).expect("request");
    let (_, headers, _) = send(&app, request).await;
    assert!(headers.contains_key("x-request-id"));
}
