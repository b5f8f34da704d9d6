//! # HTTP API Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use peshi::server::{AppState, ServerConfig, router};
use peshi::template::TemplateCatalog;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> axum::Router {
    let state = AppState::with_catalog(
        ServerConfig::default(),
        TemplateCatalog::built_in().expect("built-in catalog"),
    );
    router(Arc::new(state))
}

async fn send(req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(req).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(req).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_template_listing_and_lookup() {
    let (status, body) = get_json("/api/templates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(8));

    let (status, body) = get_json("/api/template/Germany").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["size"]["width"], 275);
    assert_eq!(body["positions"][1]["type"], "color");

    let (status, body) = get_json("/api/template/atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_generate_stickers() {
    let (status, body) = post_json(
        "/api/generate-stickers",
        json!({
            "country": "usa",
            "stickerName": "demo",
            "stickerSize": "small",
            "data": [
                {"code": "ABC001", "color": "#FF0000", "title": "Red Product"},
                {"code": "XYZ002", "color": "#00FF00", "title": "Green Product"}
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert!(body["batch_id"].is_string());
    assert_eq!(body["size"], json!({"width": 210, "height": 140}));

    let first = &body["stickers"][0];
    assert_eq!(first["id"], "sticker_usa_0");
    assert_eq!(first["filename"], "demo_usa_1_ABC001");
    assert!(first["html"].as_str().unwrap().contains("sticker-container usa small"));
    assert_eq!(first["artifact"]["template"], "usa");
}

#[tokio::test]
async fn test_generate_rejects_missing_columns() {
    let (status, body) = post_json(
        "/api/generate-stickers",
        json!({"country": "usa", "data": [{"Title": "x"}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("code"));
}

#[tokio::test]
async fn test_render_png_round_trip() {
    let (_, generated) = post_json(
        "/api/generate-stickers",
        json!({
            "country": "uk",
            "data": [{"code": "UK1", "color": "#000080"}]
        }),
    )
    .await;
    let artifact = generated["stickers"][0]["artifact"].clone();

    let req = Request::post("/api/render/png")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"artifact": artifact, "pixel_ratio": 1}).to_string()))
        .unwrap();
    let (status, bytes) = send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[1..4], b"PNG");
}

#[tokio::test]
async fn test_upload_rows_csv() {
    let boundary = "peshiboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"rows\"; filename=\"products.csv\"\r\n\
         Content-Type: text/csv\r\n\r\nCode,Colour,Title\nA1,#FF0000,Apple\n\r\n--{b}--\r\n",
        b = boundary
    );
    let req = Request::post("/api/upload-rows")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, bytes) = send(req).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["columns"], json!(["Code", "Colour", "Title"]));
    assert_eq!(body["data"][0]["Title"], "Apple");
}

#[tokio::test]
async fn test_render_png_refuses_server_files() {
    let path = std::env::temp_dir().join(format!("peshi-server-bg-{}.png", std::process::id()));
    image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]))
        .save(&path)
        .unwrap();

    let (status, body) = post_json(
        "/api/render/png",
        json!({
            "artifact": {
                "template": "custom",
                "size": {"width": 4, "height": 4},
                "decoration": {"kind": "background", "image": path.to_string_lossy()},
                "primitives": []
            },
            "pixel_ratio": 1
        }),
    )
    .await;
    std::fs::remove_file(&path).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("data URL"));
}

#[tokio::test]
async fn test_render_png_with_oversized_text() {
    let (status, bytes) = send(
        Request::post("/api/render/png")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "artifact": {
                        "template": "usa",
                        "size": {"width": 100, "height": 50},
                        "decoration": {
                            "kind": "preset",
                            "label": "USA",
                            "color": "#0052CC",
                            "header_font_size": 3_000_000_000u32,
                            "header_top": 10,
                            "border_inset": 5,
                            "border_width": 3
                        },
                        "primitives": []
                    },
                    "pixel_ratio": 8
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[1..4], b"PNG");
}
