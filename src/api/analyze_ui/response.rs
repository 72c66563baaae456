// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze-UI response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// A detected UI element in the screenshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// Corner coordinates in original-image pixels: xmin, ymin, xmax, ymax
    #[serde(rename = "box")]
    pub bbox: [f32; 4],
    /// Detection confidence (0.0-1.0)
    pub confidence: f32,
    /// Class id as produced by the detector
    pub class_id: u32,
    /// Human-readable class label
    pub class_name: String,
}

/// Per-category scores, each 0-100
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScores {
    pub accessibility: u32,
    pub consistency: u32,
    pub usability: u32,
    pub visual_design: u32,
}

/// The critique section of a report, as the model is prompted to produce it
///
/// Every field is optional/empty-able: when the reply cannot be decoded the
/// section degrades to its default rather than erroring, and absent fields
/// stay out of the serialized payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Critique {
    /// Overall quality score (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<u32>,
    /// Actionable suggestions, in model order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub improvements: Vec<String>,
    /// Positive observations, in model order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
    /// Per-category scores; present iff the reply carried them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricScores>,
}

impl Critique {
    /// Decode extracted reply fields into a critique section
    ///
    /// A reply that does not match the expected shape (wrong types, out of
    /// range) degrades to an empty section. Unknown keys are ignored.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        if fields.is_empty() {
            return Self::default();
        }

        match serde_json::from_value(Value::Object(fields)) {
            Ok(critique) => critique,
            Err(e) => {
                warn!("Model reply did not match the critique schema: {}", e);
                Self::default()
            }
        }
    }
}

/// Response payload for POST /api/analyze-ui/
///
/// The critique section comes from the multimodal model; the detection
/// extension is present only when the node runs with a loaded detector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub critique: Critique,
    /// Detected UI elements, in detector output order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<Detection>>,
    /// Public URL of the annotated screenshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_image_url: Option<String>,
}
