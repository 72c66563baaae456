// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Orchestrator tests with a scripted critique model
//!
//! Exercise the full analyze pipeline (upload -> critique -> extract)
//! without the network. Detection-path tests need real weights and are
//! marked ignored.

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use ui_critique_node::{
    analysis::CRITIQUE_PROMPT,
    vision::{FileRef, UiElementDetector},
    CritiqueModel, UiAnalyzer,
};

/// Fake critique service that records what it was asked
struct RecordingModel {
    reply: String,
    prompts: Arc<Mutex<Vec<String>>>,
    uploads: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingModel {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CritiqueModel for RecordingModel {
    async fn upload_file(&self, path: &Path) -> Result<FileRef> {
        self.uploads.lock().unwrap().push(path.to_path_buf());
        Ok(FileRef {
            uri: "files/recorded".to_string(),
            mime_type: "image/png".to_string(),
        })
    }

    async fn generate_content(&self, prompt: &str, _file: &FileRef) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Write a small valid PNG under `dir` and return its path
fn write_screenshot(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let image = image::RgbImage::from_pixel(32, 32, image::Rgb([220, 220, 220]));
    image.save(&path).unwrap();
    path
}

#[tokio::test]
async fn test_analyze_returns_decoded_critique() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_screenshot(dir.path(), "home.png");

    let reply = "```json\n{\"overallScore\": 64, \"improvements\": [\"Raise contrast.\"], \"strengths\": [\"Good spacing.\"], \"metrics\": {\"accessibility\": 50, \"consistency\": 70, \"usability\": 66, \"visualDesign\": 62}}\n```";
    let model = Arc::new(RecordingModel::new(reply));
    let analyzer = UiAnalyzer::new(
        model.clone(),
        None,
        "http://localhost:8000/media",
        dir.path(),
    );

    let report = analyzer.analyze(&path).await.unwrap();

    assert_eq!(report.critique.overall_score, Some(64));
    assert_eq!(report.critique.improvements, vec!["Raise contrast."]);
    let metrics = report.critique.metrics.unwrap();
    assert_eq!(metrics.accessibility, 50);
    assert_eq!(metrics.visual_design, 62);
    assert!(report.detections.is_none());
    assert!(report.detected_image_url.is_none());
}

#[tokio::test]
async fn test_analyze_sends_the_critique_prompt_and_upload() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_screenshot(dir.path(), "settings.png");

    let model = Arc::new(RecordingModel::new("{\"overallScore\": 50}"));
    let analyzer = UiAnalyzer::new(
        model.clone(),
        None,
        "http://localhost:8000/media",
        dir.path(),
    );

    analyzer.analyze(&path).await.unwrap();

    let uploads = model.uploads.lock().unwrap();
    assert_eq!(uploads.as_slice(), &[path]);

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0], CRITIQUE_PROMPT);
    assert!(prompts[0].contains("UI/UX design reviewer"));
}

#[tokio::test]
async fn test_analyze_degrades_on_prose_reply() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_screenshot(dir.path(), "prose.png");

    let model = Arc::new(RecordingModel::new("no json here at all"));
    let analyzer = UiAnalyzer::new(model, None, "http://localhost:8000/media", dir.path());

    let report = analyzer.analyze(&path).await.unwrap();

    assert!(report.critique.overall_score.is_none());
    assert!(report.critique.metrics.is_none());
    assert_eq!(serde_json::to_string(&report).unwrap(), "{}");
}

#[tokio::test]
async fn test_analyze_degrades_on_mistyped_reply() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_screenshot(dir.path(), "mistyped.png");

    let model = Arc::new(RecordingModel::new("{\"overallScore\": \"very good\"}"));
    let analyzer = UiAnalyzer::new(model, None, "http://localhost:8000/media", dir.path());

    let report = analyzer.analyze(&path).await.unwrap();
    assert!(report.critique.overall_score.is_none());
}

#[tokio::test]
async fn test_analyze_propagates_service_fault() {
    struct BrokenModel;

    #[async_trait]
    impl CritiqueModel for BrokenModel {
        async fn upload_file(&self, _path: &Path) -> Result<FileRef> {
            anyhow::bail!("quota exceeded")
        }

        async fn generate_content(&self, _prompt: &str, _file: &FileRef) -> Result<String> {
            anyhow::bail!("unreachable")
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let path = write_screenshot(dir.path(), "fault.png");

    let analyzer = UiAnalyzer::new(
        Arc::new(BrokenModel),
        None,
        "http://localhost:8000/media",
        dir.path(),
    );

    let error = analyzer.analyze(&path).await.unwrap_err();
    assert!(format!("{:#}", error).contains("quota exceeded"));
}

#[tokio::test]
#[ignore] // Only run if detector weights are downloaded
async fn test_analyze_with_detection_writes_annotated_sibling() {
    let weights = std::env::var("UI_DETECTOR_MODEL_PATH")
        .unwrap_or_else(|_| "./models/ui-detector.onnx".to_string());
    let detector = match UiElementDetector::new(&weights).await {
        Ok(d) => Arc::new(d),
        Err(_) => return, // Skip if weights not available
    };

    let dir = tempfile::tempdir().unwrap();
    let path = write_screenshot(dir.path(), "detect.png");

    let model = Arc::new(RecordingModel::new("{\"overallScore\": 40}"));
    let analyzer = UiAnalyzer::new(
        model,
        Some(detector),
        "http://localhost:8000/media",
        dir.path(),
    );

    let report = analyzer.analyze(&path).await.unwrap();

    assert!(report.detections.is_some());
    let url = report.detected_image_url.unwrap();
    assert_eq!(url, "http://localhost:8000/media/detected_detect.png");
    assert!(dir.path().join("detected_detect.png").exists());
}
