// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Orchestration of the critique and detection calls for one screenshot

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::extraction::extract_json;
use crate::analysis::normalize::normalize_detections;
use crate::api::analyze_ui::response::{AnalysisReport, Critique, Detection};
use crate::vision::detector::{annotate_detections, UiElementDetector};
use crate::vision::gemini_client::FileRef;

/// Prompt sent with every screenshot
pub const CRITIQUE_PROMPT: &str = r#"You are a professional UI/UX design reviewer. Your task is to analyze a screenshot of a user interface and return a JSON response evaluating the UI on various design aspects.

### Your Goals:
1. Assess the image for common design principles such as accessibility, consistency, usability, and visual design.
2. Highlight both **strengths** and **improvements** found in the UI.
3. Provide an **overallScore** between 0 and 100 reflecting the general quality of the UI.
4. Return specific **metric scores** for each of the following categories:
    - Accessibility (0-100)
    - Consistency (0-100)
    - Usability (0-100)
    - VisualDesign (0-100)

### Output Format:
Respond ONLY with a valid JSON in the structure below:

```json
{
"overallScore": <integer>,
"improvements": [
    "<clear, actionable suggestion 1>",
    "<suggestion 2>",
    ...
],
"strengths": [
    "<positive observation 1>",
    "<positive observation 2>",
    ...
],
"metrics": {
    "accessibility": <integer>,
    "consistency": <integer>,
    "usability": <integer>,
    "visualDesign": <integer>
}
}
```"#;

/// Seam to the multimodal critique service
///
/// The production implementation is `GeminiClient`; tests substitute a
/// scripted fake.
#[async_trait]
pub trait CritiqueModel: Send + Sync {
    /// Upload a local file, returning an opaque reference to it
    async fn upload_file(&self, path: &Path) -> Result<FileRef>;

    /// Generate text from a prompt plus an uploaded file reference
    async fn generate_content(&self, prompt: &str, file: &FileRef) -> Result<String>;
}

/// Runs the full analysis pipeline for one stored screenshot
pub struct UiAnalyzer {
    model: Arc<dyn CritiqueModel>,
    detector: Option<Arc<UiElementDetector>>,
    media_base_url: String,
    media_root: PathBuf,
}

impl UiAnalyzer {
    /// Create an analyzer
    ///
    /// `detector` being `None` selects the critique-only variant.
    /// `media_base_url` is the public prefix under which `media_root` is
    /// served; it becomes the base of `detectedImageUrl`.
    pub fn new(
        model: Arc<dyn CritiqueModel>,
        detector: Option<Arc<UiElementDetector>>,
        media_base_url: impl Into<String>,
        media_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model,
            detector,
            media_base_url: media_base_url.into(),
            media_root: media_root.into(),
        }
    }

    /// Whether this analyzer runs the detection step
    pub fn detection_enabled(&self) -> bool {
        self.detector.is_some()
    }

    /// Analyze a stored screenshot
    ///
    /// Service, detector, and filesystem failures propagate; an
    /// unparseable critique reply does not - the report degrades instead.
    pub async fn analyze(&self, image_path: &Path) -> Result<AnalysisReport> {
        info!("Analyzing UI screenshot: {}", image_path.display());

        let file_ref = self
            .model
            .upload_file(image_path)
            .await
            .context("screenshot upload to the critique service failed")?;

        let detection = match &self.detector {
            Some(detector) => Some(self.run_detection(detector, image_path)?),
            None => None,
        };

        let reply = self
            .model
            .generate_content(CRITIQUE_PROMPT, &file_ref)
            .await
            .context("critique generation failed")?;

        let fields = extract_json(&reply);
        if fields.is_empty() {
            warn!("Critique reply yielded no fields; returning a degraded report");
        }
        let critique = Critique::from_fields(fields);

        let mut report = AnalysisReport {
            critique,
            detections: None,
            detected_image_url: None,
        };
        if let Some((detections, url)) = detection {
            report.detections = Some(detections);
            report.detected_image_url = Some(url);
        }

        Ok(report)
    }

    /// Detect elements, write the annotated sibling image, and build the
    /// URL it will be served under
    fn run_detection(
        &self,
        detector: &UiElementDetector,
        image_path: &Path,
    ) -> Result<(Vec<Detection>, String)> {
        let image = image::open(image_path)
            .with_context(|| format!("failed to open {}", image_path.display()))?;

        let result = detector.detect_image(&image)?;
        info!(
            "Detected {} UI elements in {}ms",
            result.boxes.len(),
            result.processing_time_ms
        );

        let annotated = annotate_detections(&image, &result.boxes);

        let file_name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");
        let annotated_path = image_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("detected_{}", file_name));
        annotated
            .save(&annotated_path)
            .with_context(|| format!("failed to write {}", annotated_path.display()))?;

        let detections = normalize_detections(std::slice::from_ref(&result));
        let url = self.media_url_for(&annotated_path);

        Ok((detections, url))
    }

    /// Public URL for a file under the media root
    fn media_url_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.media_root).unwrap_or(path);
        format!(
            "{}/{}",
            self.media_base_url.trim_end_matches('/'),
            relative.to_string_lossy().replace('\\', "/")
        )
    }
}
