// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! UI element detection model
//!
//! Wraps a YOLO-family ONNX model that localizes interface elements
//! (buttons, inputs, icons, ...) in a screenshot. Runs on CPU only.

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{ArrayViewD, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::{preprocess_for_detection, Letterbox};

/// Default confidence threshold for detections
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.25;

/// Default IoU threshold for non-maximum suppression
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Class labels used when no sidecar table ships with the weights
const DEFAULT_UI_CLASSES: &[&str] = &[
    "button",
    "checkbox",
    "dropdown",
    "icon",
    "image",
    "input",
    "label",
    "link",
    "navbar",
    "radio-button",
    "slider",
    "switch",
    "table",
    "text",
    "toolbar",
];

/// A detected element with corners in original-image pixel space
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Detection confidence score (0.0-1.0)
    pub confidence: f32,
    /// Index into the result's class-name table
    pub class_id: usize,
}

impl RawDetection {
    /// Area of the box in pixels
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }
}

/// Per-image detection output
#[derive(Debug, Clone)]
pub struct UiDetectionResult {
    /// Detected boxes, in model output order after suppression
    pub boxes: Vec<RawDetection>,
    /// Class-name table for resolving `RawDetection::class_id`
    pub class_names: Vec<String>,
    /// Inference wall time in milliseconds
    pub processing_time_ms: u64,
}

/// UI element detection model
#[derive(Clone)]
pub struct UiElementDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Model output name
    output_name: String,
    /// Confidence threshold for detections
    conf_threshold: f32,
    /// IoU threshold for non-maximum suppression
    iou_threshold: f32,
    /// Class-id-to-name table
    class_names: Vec<String>,
}

impl std::fmt::Debug for UiElementDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiElementDetector")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("conf_threshold", &self.conf_threshold)
            .field("iou_threshold", &self.iou_threshold)
            .field("classes", &self.class_names.len())
            .finish_non_exhaustive()
    }
}

impl UiElementDetector {
    /// Load the detector from an ONNX weights file
    ///
    /// # Errors
    /// Returns error if:
    /// - Weights file not found
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("UI detector weights not found: {}", model_path.display());
        }

        info!("Loading UI element detector from {}", model_path.display());

        // CPU-only execution; detection shares the host with the HTTP server
        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load UI detector weights from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .unwrap_or_else(|| "output0".to_string());

        debug!(
            "Detector loaded - input: {}, output: {}",
            input_name, output_name
        );

        let class_names = load_class_names(model_path);
        info!(
            "✅ UI element detector loaded ({} classes, CPU-only)",
            class_names.len()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            output_name,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            class_names,
        })
    }

    /// Set the confidence threshold for detections
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Get the class-name table
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Run detection on a decoded screenshot
    pub fn detect_image(&self, image: &DynamicImage) -> Result<UiDetectionResult> {
        let start = std::time::Instant::now();

        let (input, letterbox) = preprocess_for_detection(image);

        let mut session = self.session.lock().unwrap();

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let boxes = self.decode_output(output_tensor.view(), &letterbox)?;

        debug!(
            "Detected {} UI elements in {}ms",
            boxes.len(),
            start.elapsed().as_millis()
        );

        Ok(UiDetectionResult {
            boxes,
            class_names: self.class_names.clone(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Decode a YOLO output tensor into detections in original pixel space
    ///
    /// Expects shape [1, 4 + num_classes, num_anchors]: four box channels
    /// (cx, cy, w, h in input space) followed by per-class scores.
    fn decode_output(
        &self,
        output: ArrayViewD<f32>,
        letterbox: &Letterbox,
    ) -> Result<Vec<RawDetection>> {
        let shape = output.shape();
        if shape.len() != 3 || shape[0] != 1 || shape[1] < 5 {
            anyhow::bail!(
                "Unexpected detector output shape: {:?}, expected [1, 4+classes, anchors]",
                shape
            );
        }

        let num_classes = shape[1] - 4;
        let num_anchors = shape[2];

        let mut candidates = Vec::new();
        for anchor in 0..num_anchors {
            let mut best_class = 0usize;
            let mut best_score = 0.0f32;
            for class in 0..num_classes {
                let score = output[IxDyn(&[0, 4 + class, anchor])];
                if score > best_score {
                    best_score = score;
                    best_class = class;
                }
            }

            if best_score < self.conf_threshold {
                continue;
            }

            let cx = output[IxDyn(&[0, 0, anchor])];
            let cy = output[IxDyn(&[0, 1, anchor])];
            let w = output[IxDyn(&[0, 2, anchor])];
            let h = output[IxDyn(&[0, 3, anchor])];

            candidates.push(RawDetection {
                x1: letterbox.unmap_x(cx - w * 0.5),
                y1: letterbox.unmap_y(cy - h * 0.5),
                x2: letterbox.unmap_x(cx + w * 0.5),
                y2: letterbox.unmap_y(cy + h * 0.5),
                confidence: best_score,
                class_id: best_class,
            });
        }

        Ok(non_max_suppression(candidates, self.iou_threshold))
    }
}

/// Load the class-name table: a `classes.txt` sidecar next to the weights
/// wins, the built-in UI element list otherwise
fn load_class_names(model_path: &Path) -> Vec<String> {
    let sidecar = model_path.with_file_name("classes.txt");
    if let Ok(contents) = std::fs::read_to_string(&sidecar) {
        let names: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        if !names.is_empty() {
            info!("Loaded {} class names from {}", names.len(), sidecar.display());
            return names;
        }
    }

    DEFAULT_UI_CLASSES.iter().map(|s| s.to_string()).collect()
}

/// Intersection-over-union of two boxes
fn iou(a: &RawDetection, b: &RawDetection) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let union = a.area() + b.area() - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}

/// Greedy per-class non-maximum suppression, highest confidence first
fn non_max_suppression(mut detections: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<RawDetection> = Vec::new();
    'candidates: for detection in detections {
        for keep in &kept {
            if keep.class_id == detection.class_id && iou(keep, &detection) > iou_threshold {
                continue 'candidates;
            }
        }
        kept.push(detection);
    }
    kept
}
