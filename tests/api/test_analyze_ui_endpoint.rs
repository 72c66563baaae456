// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /api/analyze-ui/
//!
//! These tests drive the real router with in-memory requests. The remote
//! critique service is replaced by a scripted fake; the detector is left
//! unloaded (critique-only variant), so no model files are required.

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use http_body_util::BodyExt;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;
use ui_critique_node::{
    api::{build_router, AppState},
    storage::UploadStore,
    vision::FileRef,
    CritiqueModel, UiAnalyzer,
};

const BOUNDARY: &str = "ui-critique-test-boundary";

/// A critique reply in the shape the prompt asks for
const GOOD_REPLY: &str = "Sure! ```json\n{\"overallScore\": 82, \"improvements\": [\"Add focus outlines.\"], \"strengths\": [\"Clear hierarchy.\"], \"metrics\": {\"accessibility\": 70, \"consistency\": 85, \"usability\": 84, \"visualDesign\": 80}}\n```";

/// Fake critique service returning a canned reply
struct ScriptedModel {
    reply: String,
}

#[async_trait]
impl CritiqueModel for ScriptedModel {
    async fn upload_file(&self, _path: &Path) -> Result<FileRef> {
        Ok(FileRef {
            uri: "files/scripted".to_string(),
            mime_type: "image/png".to_string(),
        })
    }

    async fn generate_content(&self, _prompt: &str, _file: &FileRef) -> Result<String> {
        Ok(self.reply.clone())
    }
}

/// Fake critique service whose upload call always fails
struct FailingModel;

#[async_trait]
impl CritiqueModel for FailingModel {
    async fn upload_file(&self, _path: &Path) -> Result<FileRef> {
        anyhow::bail!("connection refused")
    }

    async fn generate_content(&self, _prompt: &str, _file: &FileRef) -> Result<String> {
        anyhow::bail!("unreachable")
    }
}

/// Helper: router with a scripted critique model and a temp media root
fn router_with_model(media_root: &Path, model: Arc<dyn CritiqueModel>) -> axum::Router {
    let uploads = Arc::new(UploadStore::new(media_root));
    let analyzer = Arc::new(UiAnalyzer::new(
        model,
        None,
        "http://localhost:8000/media",
        media_root,
    ));
    build_router(AppState::new(analyzer, uploads))
}

fn router_with_reply(media_root: &Path, reply: &str) -> axum::Router {
    router_with_model(
        media_root,
        Arc::new(ScriptedModel {
            reply: reply.to_string(),
        }),
    )
}

/// Helper: encode one file field as a multipart body
fn multipart_body(field_name: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            field_name, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(field_name: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze-ui/")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field_name, file_name, data)))
        .unwrap()
}

/// Helper: a small valid PNG screenshot
fn png_bytes() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(24, 24, image::Rgb([240, 240, 240]));
    let mut cursor = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Validation tests
// =============================================================================

#[tokio::test]
async fn test_get_without_file_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), GOOD_REPLY);

    let request = Request::builder()
        .method("GET")
        .uri("/api/analyze-ui/")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["details"]["image"], "No file was submitted.");
}

#[tokio::test]
async fn test_post_without_multipart_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), GOOD_REPLY);

    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze-ui/")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["details"].as_object().is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn test_post_without_image_field_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), GOOD_REPLY);

    let response = router
        .oneshot(multipart_request("attachment", "screen.png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["details"]["image"], "No file was submitted.");
}

#[tokio::test]
async fn test_post_empty_file_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), GOOD_REPLY);

    let response = router
        .oneshot(multipart_request("image", "screen.png", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["details"]["image"]
        .as_str()
        .unwrap()
        .contains("empty"));
}

#[tokio::test]
async fn test_post_non_image_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), GOOD_REPLY);

    let response = router
        .oneshot(multipart_request("image", "notes.txt", b"plain text"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Success-path tests
// =============================================================================

#[tokio::test]
async fn test_valid_upload_returns_report() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), GOOD_REPLY);

    let response = router
        .oneshot(multipart_request("image", "screen.png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["overallScore"], 82);
    assert_eq!(body["metrics"]["visualDesign"], 80);
    assert_eq!(body["improvements"][0], "Add focus outlines.");
    // Critique-only variant: no detection extension
    assert!(body.get("detections").is_none());
    assert!(body.get("detectedImageUrl").is_none());
}

#[tokio::test]
async fn test_valid_upload_persists_one_timestamped_file() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), GOOD_REPLY);

    let response = router
        .oneshot(multipart_request("image", "screen.png", &png_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let upload_dir = dir.path().join("ui_uploads");
    let names: Vec<String> = std::fs::read_dir(&upload_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);

    let pattern = regex::Regex::new(r"^screen_\d{8}_\d{6}\.png$").unwrap();
    assert!(pattern.is_match(&names[0]), "unexpected name: {}", names[0]);
}

#[tokio::test]
async fn test_unparseable_reply_degrades_to_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), "I cannot review this screenshot, sorry!");

    let response = router
        .oneshot(multipart_request("image", "screen.png", &png_bytes()))
        .await
        .unwrap();

    // Extraction failure is not an HTTP error
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.get("overallScore").is_none());
    assert!(body.get("metrics").is_none());
    assert_eq!(body, serde_json::json!({}));
}

#[tokio::test]
async fn test_resubmission_stores_two_files() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), GOOD_REPLY);

    let first = router
        .clone()
        .oneshot(multipart_request("image", "screen.png", &png_bytes()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // Stored names are second-resolution; step past the collision window
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let second = router
        .oneshot(multipart_request("image", "screen.png", &png_bytes()))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let upload_dir = dir.path().join("ui_uploads");
    assert_eq!(std::fs::read_dir(&upload_dir).unwrap().count(), 2);
}

// =============================================================================
// Failure-path tests
// =============================================================================

#[tokio::test]
async fn test_service_fault_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_model(dir.path(), Arc::new(FailingModel));

    let response = router
        .oneshot(multipart_request("image", "screen.png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "internal_error");
    // The fault is opaque to the caller
    assert!(!body["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

// =============================================================================
// Health endpoint
// =============================================================================

#[tokio::test]
async fn test_health_reports_detection_variant() {
    let dir = tempfile::tempdir().unwrap();
    let router = router_with_reply(dir.path(), GOOD_REPLY);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["detection_enabled"], false);
    assert!(body["version"].as_str().is_some());
}
